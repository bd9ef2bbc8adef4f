//! Test-only helpers that build small reference databases on disk.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::initialise_schema;

/// A seeded database living inside a temporary directory.
pub struct SeededDatabase {
    _dir: TempDir,
    pub path: PathBuf,
}

/// Create an initialised but empty database.
pub fn empty_database() -> SeededDatabase {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("tft.db");
    let mut connection = Connection::open(&path).expect("open database");
    initialise_schema(&mut connection).expect("initialise schema");
    SeededDatabase { _dir: dir, path }
}

/// Create a database holding two sets with a handful of champions, traits,
/// items, and augments.
///
/// Set 16 (`TFTSet16`): Yordle, Sorcerer, Bruiser traits; Poppy (1, Yordle +
/// Bruiser), Tristana (2, Yordle), Ahri (4, Sorcerer), Kennen (4, Yordle +
/// Sorcerer), Veigar (3, Yordle + Sorcerer).
/// Set 15 (`TFTSet15`): Yordle trait; Lulu (4, Yordle).
pub fn seeded_database() -> SeededDatabase {
    let database = empty_database();
    seed(&database.path);
    database
}

fn seed(path: &Path) {
    let connection = Connection::open(path).expect("open database");
    connection
        .execute_batch(
            "INSERT INTO set_data (id, name, mutator, set_number) VALUES
                (1, 'Set 16', 'TFTSet16', 16),
                (2, 'Set 15', 'TFTSet15', 15);
             INSERT INTO traits (id, set_data_id, api_name, name, description, icon, effects) VALUES
                (1, 1, 'TFT16_Yordle', 'Yordle', 'Small but mighty', 'yordle.png', '[{\"minUnits\":2}]'),
                (2, 1, 'TFT16_Sorcerer', 'Sorcerer', NULL, 'sorcerer.png', NULL),
                (3, 1, 'TFT16_Bruiser', 'Bruiser', NULL, NULL, '{}'),
                (4, 2, 'TFT15_Yordle', 'Yordle', NULL, 'old-yordle.png', NULL);
             INSERT INTO champions
                (id, set_data_id, api_name, character_name, name, cost, role, icon, square_icon,
                 tile_icon, ability, stats) VALUES
                (1, 1, 'TFT16_Poppy', 'TFT16_Poppy', 'Poppy', 1, 'Tank', 'poppy.png', NULL, NULL,
                 NULL, '{\"hp\":700}'),
                (2, 1, 'TFT16_Tristana', 'TFT16_Tristana', 'Tristana', 2, NULL, NULL, NULL, NULL,
                 NULL, NULL),
                (3, 1, 'TFT16_Ahri', 'TFT16_Ahri', 'Ahri', 4, 'Caster', 'ahri.png', 'ahri-sq.png',
                 NULL, '{\"name\":\"Spirit Rush\"}', '{\"hp\":900}'),
                (4, 1, 'TFT16_Kennen', 'TFT16_Kennen', 'Kennen', 4, NULL, NULL, NULL, NULL,
                 NULL, NULL),
                (5, 1, 'TFT16_Veigar', 'TFT16_Veigar', 'Veigar', 3, NULL, NULL, NULL, NULL,
                 NULL, NULL),
                (6, 2, 'TFT15_Lulu', 'TFT15_Lulu', 'Lulu', 4, NULL, NULL, NULL, NULL,
                 NULL, NULL);
             INSERT INTO champion_traits (champion_id, trait_id) VALUES
                (1, 1), (1, 3), (2, 1), (3, 2), (4, 1), (4, 2), (5, 1), (5, 2), (6, 4);
             INSERT INTO items
                (id, api_name, name, description, icon, is_unique, composition, effects,
                 associated_traits, incompatible_traits, tags) VALUES
                (1, 'TFT_Item_BFSword', 'B.F. Sword', NULL, 'bf.png', 0, '[]', '{\"AD\":10}',
                 NULL, NULL, NULL),
                (2, 'TFT_Item_Deathblade', 'Deathblade', 'More damage', NULL, 1,
                 '[\"TFT_Item_BFSword\",\"TFT_Item_BFSword\"]', NULL, NULL, NULL, '[\"AD\"]');
             INSERT INTO augments
                (id, api_name, name, description, icon, tier, is_unique, effects,
                 associated_traits, incompatible_traits, tags) VALUES
                (1, 'TFT16_Augment_YordleCrest', 'Yordle Crest', NULL, 'crest.png', 2, 0, NULL,
                 '[\"TFT16_Yordle\"]', NULL, NULL),
                (2, 'TFT_Augment_Lotus', 'Jeweled Lotus', NULL, 'lotus_III.png', 3, 1, '{}',
                 '[]', NULL, NULL),
                (3, 'TFT16_Augment_SorcCrown', 'Sorcerer Crown', NULL, NULL, 2, 0, NULL,
                 '[\"TFT16_Sorcerer\",\"TFT16_Yordle\"]', NULL, NULL),
                (4, 'TFT_Augment_Cash', 'Cash', NULL, NULL, 1, 0, NULL, NULL, NULL, NULL);",
        )
        .expect("seed reference data");
}

/// Overwrite a stored payload with text that is not JSON, with CHECK
/// constraints disabled for the connection.
pub fn corrupt_item_effects(path: &Path, item_id: i64) {
    let connection = Connection::open(path).expect("open database");
    connection
        .execute_batch("PRAGMA ignore_check_constraints = ON;")
        .expect("disable checks");
    connection
        .execute(
            "UPDATE items SET effects = ?1 WHERE id = ?2",
            params!["{not json", item_id],
        )
        .expect("corrupt item effects");
}
