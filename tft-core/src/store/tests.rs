//! Behavioural coverage for the SQLite schema and catalogue.

use rstest::{fixture, rstest};
use rusqlite::Connection;
use serde_json::json;

use crate::test_support::{SeededDatabase, corrupt_item_effects, empty_database, seeded_database};
use crate::{
    AugmentFilter, AugmentTier, Catalog, CatalogError, ChampionFilter, SCHEMA_VERSION,
    SchemaError, SqliteCatalog, initialise_schema,
};

#[fixture]
fn seeded() -> SeededDatabase {
    seeded_database()
}

fn open(database: &SeededDatabase) -> SqliteCatalog {
    SqliteCatalog::open(&database.path).expect("open catalogue")
}

fn names<T>(rows: &[T], name: impl Fn(&T) -> &str) -> Vec<&str> {
    rows.iter().map(name).collect()
}

#[rstest]
fn schema_rejects_foreign_version() {
    let mut connection = Connection::open_in_memory().expect("open database");
    initialise_schema(&mut connection).expect("initialise schema");
    connection
        .execute("UPDATE tft_schema_version SET version = 99", [])
        .expect("bump version");

    let err = initialise_schema(&mut connection).expect_err("mismatch should fail");
    assert!(matches!(
        err,
        SchemaError::VersionMismatch { expected: SCHEMA_VERSION, found: 99 }
    ));
}

#[rstest]
fn schema_enforces_set_ownership() {
    let mut connection = Connection::open_in_memory().expect("open database");
    initialise_schema(&mut connection).expect("initialise schema");
    let result = connection.execute(
        "INSERT INTO champions (set_data_id, api_name, character_name, name, cost)
         VALUES (42, 'TFT16_Ahri', 'TFT16_Ahri', 'Ahri', 4)",
        [],
    );
    assert!(result.is_err(), "orphan champion must be rejected");
}

#[rstest]
fn deleting_a_set_cascades(seeded: SeededDatabase) {
    let mut connection = Connection::open(&seeded.path).expect("open database");
    initialise_schema(&mut connection).expect("enable foreign keys");
    connection
        .execute("DELETE FROM set_data WHERE id = 1", [])
        .expect("delete set");
    let links: i64 = connection
        .query_row("SELECT COUNT(*) FROM champion_traits", [], |row| row.get(0))
        .expect("count links");
    assert_eq!(links, 1);
}

#[rstest]
fn item_api_names_are_unique() {
    let mut connection = Connection::open_in_memory().expect("open database");
    initialise_schema(&mut connection).expect("initialise schema");
    let insert = "INSERT INTO items (api_name, name, is_unique) VALUES ('TFT_Item_X', 'X', 0)";
    connection.execute(insert, []).expect("first insert");
    assert!(connection.execute(insert, []).is_err());
}

#[rstest]
fn open_rejects_uninitialised_database() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let path = dir.path().join("blank.db");
    Connection::open(&path)
        .and_then(|connection| connection.execute_batch("CREATE TABLE unrelated (id INTEGER);"))
        .expect("create blank database");

    let err = SqliteCatalog::open(&path).expect_err("missing schema should fail");
    assert!(matches!(err, CatalogError::SchemaMismatch { found: None, .. }));
}

#[rstest]
fn open_rejects_missing_file() {
    let dir = tempfile::TempDir::new().expect("create temp dir");
    let err = SqliteCatalog::open(dir.path().join("absent.db")).expect_err("missing file");
    assert!(matches!(err, CatalogError::OpenDatabase { .. }));
}

#[rstest]
fn empty_database_lists_nothing() {
    let database = empty_database();
    let catalog = open(&database);
    assert!(catalog.champions(&ChampionFilter::default()).expect("champions").is_empty());
    assert!(catalog.items().expect("items").is_empty());
    assert!(catalog.sets().expect("sets").is_empty());
    let composition = catalog.composition("Yordle", None).expect("composition");
    assert!(composition.champions.is_empty());
    assert!(composition.synergies.is_empty());
}

#[rstest]
fn champions_carry_sorted_traits_and_payloads(seeded: SeededDatabase) {
    let champions = open(&seeded)
        .champions(&ChampionFilter::default())
        .expect("list champions");
    assert_eq!(champions.len(), 6);
    let poppy = &champions[0];
    assert_eq!(poppy.name, "Poppy");
    assert_eq!(poppy.traits, ["Bruiser", "Yordle"]);
    assert_eq!(poppy.stats.as_ref().map(|blob| blob.as_value()), Some(&json!({"hp": 700})));
    assert!(poppy.ability.is_none());
}

#[rstest]
#[case(ChampionFilter { cost: Some(4), ..ChampionFilter::default() }, &["Ahri", "Kennen", "Lulu"])]
#[case(
    ChampionFilter { cost: Some(4), set: Some("TFTSet16".into()), ..ChampionFilter::default() },
    &["Ahri", "Kennen"]
)]
#[case(ChampionFilter { set: Some("Set 15".into()), ..ChampionFilter::default() }, &["Lulu"])]
#[case(
    ChampionFilter { trait_name: Some("Yordle".into()), ..ChampionFilter::default() },
    &["Poppy", "Tristana", "Kennen", "Veigar", "Lulu"]
)]
#[case(
    ChampionFilter { trait_name: Some("Sorcerer".into()), cost: Some(3), set: None },
    &["Veigar"]
)]
#[case(ChampionFilter { cost: Some(7), ..ChampionFilter::default() }, &[])]
fn champion_filters_combine(
    seeded: SeededDatabase,
    #[case] filter: ChampionFilter,
    #[case] expected: &[&str],
) {
    let champions = open(&seeded).champions(&filter).expect("list champions");
    assert_eq!(names(&champions, |champion| champion.name.as_str()), expected);
    if let Some(cost) = filter.cost {
        assert!(champions.iter().all(|champion| champion.cost == cost));
    }
}

#[rstest]
#[case("ahri")]
#[case("Ahri")]
#[case("AHRI")]
fn champion_lookup_ignores_case(seeded: SeededDatabase, #[case] name: &str) {
    let detail = open(&seeded)
        .champion_by_name(name)
        .expect("look up champion")
        .expect("champion exists");
    assert_eq!(detail.id, 3);
    assert_eq!(detail.name, "Ahri");
    assert_eq!(detail.set_name, "Set 16");
    assert_eq!(detail.square_icon.as_deref(), Some("ahri-sq.png"));
    assert_eq!(names(&detail.traits, |badge| badge.name.as_str()), ["Sorcerer"]);
    assert_eq!(detail.traits[0].icon.as_deref(), Some("sorcerer.png"));
}

#[rstest]
#[case("Ари")]
#[case("АРИ")]
#[case("ари")]
fn champion_lookup_folds_non_ascii_case(seeded: SeededDatabase, #[case] name: &str) {
    let connection = Connection::open(&seeded.path).expect("open writer");
    connection
        .execute(
            "INSERT INTO champions (id, set_data_id, api_name, character_name, name, cost)
             VALUES (7, 1, 'TFT16_Ari', 'TFT16_Ari', 'Ари', 3)",
            [],
        )
        .expect("insert champion");

    let detail = open(&seeded)
        .champion_by_name(name)
        .expect("look up champion")
        .expect("champion exists");
    assert_eq!(detail.id, 7);
    assert_eq!(detail.name, "Ари");
    assert!(detail.traits.is_empty());
}

#[rstest]
fn champion_lookup_misses_cleanly(seeded: SeededDatabase) {
    assert!(open(&seeded).champion_by_name("Zed").expect("look up").is_none());
}

#[rstest]
fn composition_orders_members_and_synergies(seeded: SeededDatabase) {
    let composition = open(&seeded)
        .composition("Yordle", Some("TFTSet16"))
        .expect("build composition");
    assert_eq!(composition.trait_name, "Yordle");
    assert_eq!(
        names(&composition.champions, |member| member.name.as_str()),
        ["Poppy", "Tristana", "Veigar", "Kennen"]
    );
    let costs: Vec<i64> = composition.champions.iter().map(|member| member.cost).collect();
    assert!(costs.is_sorted());

    let tally: Vec<(&str, usize)> = composition
        .synergies
        .iter()
        .map(|synergy| (synergy.name.as_str(), synergy.count))
        .collect();
    assert_eq!(tally, [("Yordle", 4), ("Sorcerer", 2), ("Bruiser", 1)]);
    assert_eq!(composition.synergies[0].icon.as_deref(), Some("yordle.png"));
}

#[rstest]
fn composition_spans_sets_when_unscoped(seeded: SeededDatabase) {
    let composition = open(&seeded)
        .composition("Yordle", None)
        .expect("build composition");
    assert_eq!(composition.champions.len(), 5);
    assert_eq!(composition.champions[4].name, "Lulu");
    assert_eq!(composition.synergies[0].name, "Yordle");
    assert_eq!(composition.synergies[0].count, composition.champions.len());
}

#[rstest]
#[case(None, 4)]
#[case(Some("Set 15"), 1)]
#[case(Some("TFTSet16"), 3)]
#[case(Some("Set 99"), 0)]
fn traits_scope_by_set(seeded: SeededDatabase, #[case] set: Option<&str>, #[case] count: usize) {
    assert_eq!(open(&seeded).traits(set).expect("list traits").len(), count);
}

#[rstest]
fn items_decode_payloads(seeded: SeededDatabase) {
    let items = open(&seeded).items().expect("list items");
    assert_eq!(names(&items, |item| item.name.as_str()), ["B.F. Sword", "Deathblade"]);
    assert!(items[1].is_unique);
    assert_eq!(
        items[1].composition.as_ref().map(|blob| blob.as_value()),
        Some(&json!(["TFT_Item_BFSword", "TFT_Item_BFSword"]))
    );
}

#[rstest]
#[case(AugmentFilter::default(), &["Yordle Crest", "Jeweled Lotus", "Sorcerer Crown", "Cash"])]
#[case(AugmentFilter { tier: Some(2), trait_name: None }, &["Yordle Crest", "Sorcerer Crown"])]
#[case(AugmentFilter { tier: None, trait_name: Some("yordle".into()) }, &["Yordle Crest", "Sorcerer Crown"])]
#[case(AugmentFilter { tier: Some(2), trait_name: Some("SORC".into()) }, &["Sorcerer Crown"])]
#[case(AugmentFilter { tier: Some(3), trait_name: Some("Yordle".into()) }, &[])]
fn augment_filters_combine(
    seeded: SeededDatabase,
    #[case] filter: AugmentFilter,
    #[case] expected: &[&str],
) {
    let augments = open(&seeded).augments(&filter).expect("list augments");
    assert_eq!(names(&augments, |augment| augment.name.as_str()), expected);
}

#[rstest]
fn augment_tiers_are_typed(seeded: SeededDatabase) {
    let augments = open(&seeded)
        .augments(&AugmentFilter { tier: Some(3), trait_name: None })
        .expect("list augments");
    assert_eq!(augments[0].tier, AugmentTier::Prismatic);
}

#[rstest]
fn sets_report_counts(seeded: SeededDatabase) {
    let sets = open(&seeded).sets().expect("list sets");
    let summary: Vec<_> = sets
        .iter()
        .map(|set| (set.mutator.as_str(), set.set_number, set.champion_count, set.trait_count))
        .collect();
    assert_eq!(summary, [("TFTSet16", 16, 5, 3), ("TFTSet15", 15, 1, 1)]);
}

#[rstest]
fn corrupt_payload_is_reported(seeded: SeededDatabase) {
    corrupt_item_effects(&seeded.path, 1);
    let err = open(&seeded).items().expect_err("corrupt payload");
    assert!(matches!(
        err,
        CatalogError::CorruptBlob { table: "items", column: "effects", id: 1, .. }
    ));
}

#[rstest]
fn reads_proceed_while_a_writer_holds_the_lock(seeded: SeededDatabase) {
    let writer = Connection::open(&seeded.path).expect("open writer");
    writer
        .execute_batch("BEGIN EXCLUSIVE; DELETE FROM items;")
        .expect("hold exclusive lock");

    let items = open(&seeded).items().expect("list items during write");
    assert_eq!(names(&items, |item| item.name.as_str()), ["B.F. Sword", "Deathblade"]);

    writer.execute_batch("ROLLBACK").expect("release lock");
}
