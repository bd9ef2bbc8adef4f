#![forbid(unsafe_code)]

use std::collections::HashMap;

use log::info;
use rusqlite::{Connection, Error as SqliteError, Transaction, params};
use thiserror::Error;
use tft_core::store::TABLES_IN_DELETE_ORDER;
use tft_core::{
    AugmentRecord, Blob, ChampionRecord, ItemRecord, SchemaError, SetRecord, TraitRecord,
    initialise_schema,
};

use crate::transform::{LoadPlan, PlanWarnings, SetPlan};

/// Row counts written by a load, plus the warnings raised while planning it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub items: usize,
    pub augments: usize,
    pub sets: usize,
    pub traits: usize,
    pub champions: usize,
    pub champion_traits: usize,
    pub warnings: PlanWarnings,
}

/// Replace the stored reference data with `plan`.
///
/// Each phase commits on its own: clearing, items and augments, the set row,
/// traits, champions, and finally champion/trait links. A failure stops the
/// remaining phases and leaves whatever the last commit wrote.
///
/// # Examples
/// ```
/// use rusqlite::Connection;
/// use tft_data::store::persist_plan;
/// use tft_data::transform::LoadPlan;
///
/// let mut conn = Connection::open_in_memory().expect("create in-memory database");
/// let report = persist_plan(&mut conn, &LoadPlan::default()).expect("persist empty plan");
/// assert_eq!(report.items, 0);
/// assert_eq!(report.sets, 0);
/// ```
pub fn persist_plan(
    connection: &mut Connection,
    plan: &LoadPlan,
) -> Result<LoadReport, PersistError> {
    initialise_schema(connection)?;

    clear_tables(connection)?;
    let mut report = LoadReport {
        warnings: plan.warnings,
        ..LoadReport::default()
    };

    let (items, augments) = insert_catalogue(connection, &plan.items, &plan.augments)?;
    report.items = items;
    report.augments = augments;
    info!("loaded {items} items and {augments} augments");

    if let Some(set) = &plan.set {
        persist_set(connection, set, &mut report)?;
    }

    Ok(report)
}

fn persist_set(
    connection: &mut Connection,
    plan: &SetPlan,
    report: &mut LoadReport,
) -> Result<(), PersistError> {
    let set_id = insert_set(connection, &plan.set)?;
    report.sets = 1;
    info!("processing set {} ({})", plan.set.name, plan.set.mutator);

    let trait_ids = insert_traits(connection, set_id, &plan.traits)?;
    report.traits = plan.traits.len();
    info!("loaded {} traits for set {set_id}", report.traits);

    let champion_ids = insert_champions(connection, set_id, &plan.champions)?;
    report.champions = champion_ids.len();

    report.champion_traits = insert_links(connection, &plan.champions, &champion_ids, &trait_ids)?;
    info!(
        "loaded {} champions with {} trait links for set {set_id}",
        report.champions, report.champion_traits
    );
    Ok(())
}

fn begin(connection: &mut Connection) -> Result<Transaction<'_>, PersistError> {
    connection
        .transaction()
        .map_err(sqlite_error("begin persistence transaction"))
}

fn commit(transaction: Transaction<'_>) -> Result<(), PersistError> {
    transaction
        .commit()
        .map_err(sqlite_error("commit persistence transaction"))
}

fn clear_tables(connection: &mut Connection) -> Result<(), PersistError> {
    info!("clearing existing data");
    let transaction = begin(connection)?;
    for table in TABLES_IN_DELETE_ORDER {
        transaction
            .execute(&format!("DELETE FROM {table}"), [])
            .map_err(sqlite_error("clear table"))?;
    }
    commit(transaction)
}

fn insert_catalogue(
    connection: &mut Connection,
    items: &[ItemRecord],
    augments: &[AugmentRecord],
) -> Result<(usize, usize), PersistError> {
    let transaction = begin(connection)?;
    {
        let mut insert_item = transaction
            .prepare_cached(
                "INSERT INTO items (
                    api_name, name, description, icon, is_unique, composition, effects,
                    associated_traits, incompatible_traits, tags
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(sqlite_error("prepare insert item"))?;
        for item in items {
            insert_item
                .execute(params![
                    item.api_name,
                    item.name,
                    item.description,
                    item.icon,
                    item.is_unique,
                    encode(item.composition.as_ref(), "items")?,
                    encode(item.effects.as_ref(), "items")?,
                    encode(item.associated_traits.as_ref(), "items")?,
                    encode(item.incompatible_traits.as_ref(), "items")?,
                    encode(item.tags.as_ref(), "items")?,
                ])
                .map_err(sqlite_error("insert item"))?;
        }

        let mut insert_augment = transaction
            .prepare_cached(
                "INSERT INTO augments (
                    api_name, name, description, icon, tier, is_unique, effects,
                    associated_traits, incompatible_traits, tags
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(sqlite_error("prepare insert augment"))?;
        for augment in augments {
            insert_augment
                .execute(params![
                    augment.api_name,
                    augment.name,
                    augment.description,
                    augment.icon,
                    augment.tier.rank(),
                    augment.is_unique,
                    encode(augment.effects.as_ref(), "augments")?,
                    encode(augment.associated_traits.as_ref(), "augments")?,
                    encode(augment.incompatible_traits.as_ref(), "augments")?,
                    encode(augment.tags.as_ref(), "augments")?,
                ])
                .map_err(sqlite_error("insert augment"))?;
        }
    }
    commit(transaction)?;
    Ok((items.len(), augments.len()))
}

fn insert_set(connection: &mut Connection, set: &SetRecord) -> Result<i64, PersistError> {
    let transaction = begin(connection)?;
    transaction
        .execute(
            "INSERT INTO set_data (name, mutator, set_number) VALUES (?1, ?2, ?3)",
            params![set.name, set.mutator, set.set_number],
        )
        .map_err(sqlite_error("insert set"))?;
    let id = transaction.last_insert_rowid();
    commit(transaction)?;
    Ok(id)
}

/// Insert traits and map each display name to the id of its first trait.
fn insert_traits(
    connection: &mut Connection,
    set_id: i64,
    traits: &[TraitRecord],
) -> Result<HashMap<String, i64>, PersistError> {
    let transaction = begin(connection)?;
    let mut ids = HashMap::with_capacity(traits.len());
    {
        let mut insert_trait = transaction
            .prepare_cached(
                "INSERT INTO traits (set_data_id, api_name, name, description, icon, effects)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(sqlite_error("prepare insert trait"))?;
        for record in traits {
            insert_trait
                .execute(params![
                    set_id,
                    record.api_name,
                    record.name,
                    record.description,
                    record.icon,
                    encode(record.effects.as_ref(), "traits")?,
                ])
                .map_err(sqlite_error("insert trait"))?;
            ids.entry(record.name.clone())
                .or_insert_with(|| transaction.last_insert_rowid());
        }
    }
    commit(transaction)?;
    Ok(ids)
}

fn insert_champions(
    connection: &mut Connection,
    set_id: i64,
    champions: &[ChampionRecord],
) -> Result<Vec<i64>, PersistError> {
    let transaction = begin(connection)?;
    let mut ids = Vec::with_capacity(champions.len());
    {
        let mut insert_champion = transaction
            .prepare_cached(
                "INSERT INTO champions (
                    set_data_id, api_name, character_name, name, cost, role, icon,
                    square_icon, tile_icon, ability, stats
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )
            .map_err(sqlite_error("prepare insert champion"))?;
        for champion in champions {
            insert_champion
                .execute(params![
                    set_id,
                    champion.api_name,
                    champion.character_name,
                    champion.name,
                    champion.cost,
                    champion.role,
                    champion.icon,
                    champion.square_icon,
                    champion.tile_icon,
                    encode(champion.ability.as_ref(), "champions")?,
                    encode(champion.stats.as_ref(), "champions")?,
                ])
                .map_err(sqlite_error("insert champion"))?;
            ids.push(transaction.last_insert_rowid());
        }
    }
    commit(transaction)?;
    Ok(ids)
}

fn insert_links(
    connection: &mut Connection,
    champions: &[ChampionRecord],
    champion_ids: &[i64],
    trait_ids: &HashMap<String, i64>,
) -> Result<usize, PersistError> {
    let transaction = begin(connection)?;
    let mut linked = 0;
    {
        let mut insert_link = transaction
            .prepare_cached(
                "INSERT OR IGNORE INTO champion_traits (champion_id, trait_id) VALUES (?1, ?2)",
            )
            .map_err(sqlite_error("prepare link champion"))?;
        for (champion, champion_id) in champions.iter().zip(champion_ids) {
            for trait_id in champion
                .traits
                .iter()
                .filter_map(|name| trait_ids.get(name))
            {
                linked += insert_link
                    .execute(params![champion_id, trait_id])
                    .map_err(sqlite_error("link champion to trait"))?;
            }
        }
    }
    commit(transaction)?;
    Ok(linked)
}

fn encode(blob: Option<&Blob>, table: &'static str) -> Result<Option<String>, PersistError> {
    blob.map(Blob::to_json)
        .transpose()
        .map_err(|source| PersistError::EncodeBlob { table, source })
}

fn sqlite_error(operation: &'static str) -> impl FnOnce(SqliteError) -> PersistError {
    move |source| PersistError::Sqlite { operation, source }
}

/// Errors raised when writing a load plan.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("failed to {operation}")]
    Sqlite {
        operation: &'static str,
        #[source]
        source: SqliteError,
    },
    #[error("failed to encode a {table} payload")]
    EncodeBlob {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
