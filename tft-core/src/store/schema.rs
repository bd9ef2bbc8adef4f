use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Version recorded in `tft_schema_version` by [`initialise_schema`].
pub const SCHEMA_VERSION: i64 = 1;

/// Data tables ordered so that deleting them in sequence never orphans a row:
/// the join table first, then set-scoped dependents, then their owner, then
/// the global tables.
pub const TABLES_IN_DELETE_ORDER: [&str; 6] = [
    "champion_traits",
    "champions",
    "traits",
    "set_data",
    "items",
    "augments",
];

/// Initialise the reference data schema inside an SQLite database.
///
/// Foreign keys are enabled on the connection, the database is switched to
/// write-ahead logging, every table and index is created if missing, and the
/// schema version is recorded. A database that
/// already carries a different version is rejected.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use tft_core::{SCHEMA_VERSION, initialise_schema};
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// initialise_schema(&mut conn).expect("create schema");
/// initialise_schema(&mut conn).expect("schema creation is idempotent");
///
/// let version: i64 = conn
///     .query_row("SELECT version FROM tft_schema_version", [], |row| row.get(0))
///     .expect("read schema version");
/// assert_eq!(version, SCHEMA_VERSION);
/// ```
pub fn initialise_schema(connection: &mut Connection) -> Result<(), SchemaError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| SchemaError::ForeignKeys { source })?;
    // Readers see the last committed load while a writer holds its lock.
    // In-memory databases answer "memory" and stay as they are.
    connection
        .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
        .map_err(|source| SchemaError::Migration {
            step: "enable write-ahead log",
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| SchemaError::Migration {
            step: "begin schema transaction",
            source,
        })?;

    create_set_tables(&transaction)?;
    create_global_tables(&transaction)?;
    create_indexes(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction
        .commit()
        .map_err(|source| SchemaError::Migration {
            step: "commit schema transaction",
            source,
        })?;

    Ok(())
}

/// Read the recorded schema version, or `None` for an uninitialised database.
pub fn stored_version(connection: &Connection) -> Result<Option<i64>, SqliteError> {
    let has_table = connection
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tft_schema_version'",
            [],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if !has_table {
        return Ok(None);
    }

    connection
        .query_row("SELECT version FROM tft_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
}

fn create_set_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create set_data",
        "CREATE TABLE IF NOT EXISTS set_data (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            mutator TEXT NOT NULL,
            set_number INTEGER NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "create traits",
        "CREATE TABLE IF NOT EXISTS traits (
            id INTEGER PRIMARY KEY,
            set_data_id INTEGER NOT NULL,
            api_name TEXT NOT NULL,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            description TEXT,
            icon TEXT,
            effects TEXT CHECK (effects IS NULL OR json_valid(effects)),
            FOREIGN KEY (set_data_id) REFERENCES set_data(id) ON DELETE CASCADE
        )",
    )?;
    run_migration_step(
        transaction,
        "create champions",
        "CREATE TABLE IF NOT EXISTS champions (
            id INTEGER PRIMARY KEY,
            set_data_id INTEGER NOT NULL,
            api_name TEXT NOT NULL,
            character_name TEXT NOT NULL,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            cost INTEGER NOT NULL,
            role TEXT,
            icon TEXT,
            square_icon TEXT,
            tile_icon TEXT,
            ability TEXT CHECK (ability IS NULL OR json_valid(ability)),
            stats TEXT CHECK (stats IS NULL OR json_valid(stats)),
            FOREIGN KEY (set_data_id) REFERENCES set_data(id) ON DELETE CASCADE
        )",
    )?;
    run_migration_step(
        transaction,
        "create champion_traits",
        "CREATE TABLE IF NOT EXISTS champion_traits (
            champion_id INTEGER NOT NULL,
            trait_id INTEGER NOT NULL,
            PRIMARY KEY (champion_id, trait_id),
            FOREIGN KEY (champion_id) REFERENCES champions(id) ON DELETE CASCADE,
            FOREIGN KEY (trait_id) REFERENCES traits(id) ON DELETE CASCADE
        ) WITHOUT ROWID",
    )
}

fn create_global_tables(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create items",
        "CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY,
            api_name TEXT NOT NULL,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            description TEXT,
            icon TEXT,
            is_unique INTEGER NOT NULL CHECK (is_unique IN (0, 1)),
            composition TEXT CHECK (composition IS NULL OR json_valid(composition)),
            effects TEXT CHECK (effects IS NULL OR json_valid(effects)),
            associated_traits TEXT
                CHECK (associated_traits IS NULL OR json_valid(associated_traits)),
            incompatible_traits TEXT
                CHECK (incompatible_traits IS NULL OR json_valid(incompatible_traits)),
            tags TEXT CHECK (tags IS NULL OR json_valid(tags))
        )",
    )?;
    run_migration_step(
        transaction,
        "create augments",
        "CREATE TABLE IF NOT EXISTS augments (
            id INTEGER PRIMARY KEY,
            api_name TEXT NOT NULL,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            description TEXT,
            icon TEXT,
            tier INTEGER NOT NULL CHECK (tier BETWEEN 1 AND 3),
            is_unique INTEGER NOT NULL CHECK (is_unique IN (0, 1)),
            effects TEXT CHECK (effects IS NULL OR json_valid(effects)),
            associated_traits TEXT
                CHECK (associated_traits IS NULL OR json_valid(associated_traits)),
            incompatible_traits TEXT
                CHECK (incompatible_traits IS NULL OR json_valid(incompatible_traits)),
            tags TEXT CHECK (tags IS NULL OR json_valid(tags))
        )",
    )
}

fn create_indexes(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    let steps: [(&'static str, &str); 12] = [
        (
            "index set_data identity",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_set_data_name_mutator
                ON set_data(name, mutator)",
        ),
        (
            "index traits by set",
            "CREATE INDEX IF NOT EXISTS idx_traits_set ON traits(set_data_id)",
        ),
        (
            "index traits by api name",
            "CREATE INDEX IF NOT EXISTS idx_traits_api_name ON traits(api_name)",
        ),
        (
            "index traits by name",
            "CREATE INDEX IF NOT EXISTS idx_traits_name ON traits(name)",
        ),
        (
            "index champions by set",
            "CREATE INDEX IF NOT EXISTS idx_champions_set ON champions(set_data_id)",
        ),
        (
            "index champions by api name",
            "CREATE INDEX IF NOT EXISTS idx_champions_api_name ON champions(api_name)",
        ),
        (
            "index champions by cost",
            "CREATE INDEX IF NOT EXISTS idx_champions_cost ON champions(cost)",
        ),
        (
            "index champion_traits by trait",
            "CREATE INDEX IF NOT EXISTS idx_champion_traits_trait
                ON champion_traits(trait_id, champion_id)",
        ),
        (
            "index items by api name",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_items_api_name ON items(api_name)",
        ),
        (
            "index items by name",
            "CREATE INDEX IF NOT EXISTS idx_items_name ON items(name)",
        ),
        (
            "index augments by api name",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_augments_api_name ON augments(api_name)",
        ),
        (
            "index augments by tier",
            "CREATE INDEX IF NOT EXISTS idx_augments_tier ON augments(tier)",
        ),
    ];

    for (step, sql) in steps {
        run_migration_step(transaction, step, sql)?;
    }
    Ok(())
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), SchemaError> {
    run_migration_step(
        transaction,
        "create schema version table",
        "CREATE TABLE IF NOT EXISTS tft_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing_version: Option<i64> = transaction
        .query_row("SELECT version FROM tft_schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|source| SchemaError::Migration {
            step: "read schema version",
            source,
        })?;

    match existing_version {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(SchemaError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO tft_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| SchemaError::Migration {
                step: "record schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    step: &'static str,
    sql: &str,
) -> Result<(), SchemaError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| SchemaError::Migration { step, source })
}

/// Errors raised when initialising the reference data schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Enabling foreign key enforcement failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        #[source]
        source: SqliteError,
    },
    /// A DDL statement failed.
    #[error("failed to execute migration step '{step}'")]
    Migration {
        step: &'static str,
        #[source]
        source: SqliteError,
    },
    /// The database was created by an incompatible build.
    #[error("expected schema version {expected} but found {found}; rebuild the database")]
    VersionMismatch { expected: i64, found: i64 },
}
