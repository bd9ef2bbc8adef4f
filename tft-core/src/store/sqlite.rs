//! SQLite-backed [`Catalog`] implementation.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use rusqlite::{Connection, OpenFlags, Row, params};

use crate::catalog::tally_synergies;
use crate::{
    AugmentFilter, AugmentSummary, AugmentTier, Blob, Catalog, CatalogError, ChampionDetail,
    ChampionFilter, ChampionSummary, Composition, CompositionMember, ItemSummary, SetSummary,
    TraitBadge, TraitSummary,
};

use super::schema::{SCHEMA_VERSION, stored_version};

/// How long a read waits on a lock held by a loader before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Champions matching optional trait, cost, and set filters.
const CHAMPION_FILTER_SQL: &str = "
    FROM champions AS c
    JOIN set_data AS s ON s.id = c.set_data_id
    WHERE (?1 IS NULL OR EXISTS (
            SELECT 1 FROM champion_traits AS ct
            JOIN traits AS t ON t.id = ct.trait_id
            WHERE ct.champion_id = c.id AND t.name = ?1))
      AND (?2 IS NULL OR c.cost = ?2)
      AND (?3 IS NULL OR s.name = ?3 OR s.mutator = ?3)";

/// Read-only catalogue over a database written by the loader.
///
/// Every query opens its own read-only connection, so a single instance can
/// be shared across threads and sees the latest committed load.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    /// Open the catalogue, checking that the database carries the expected
    /// schema version.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let catalog = Self {
            path: path.as_ref().to_path_buf(),
        };
        let connection = catalog.connect()?;
        let found = stored_version(&connection).map_err(|source| CatalogError::Query {
            operation: "read schema version",
            source,
        })?;
        if found != Some(SCHEMA_VERSION) {
            return Err(CatalogError::SchemaMismatch {
                path: catalog.path,
                expected: SCHEMA_VERSION,
                found,
            });
        }
        Ok(catalog)
    }

    /// Location of the backing database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, CatalogError> {
        let open_error = |source| CatalogError::OpenDatabase {
            path: self.path.clone(),
            source,
        };
        let connection = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(open_error)?;
        connection.busy_timeout(BUSY_TIMEOUT).map_err(open_error)?;
        Ok(connection)
    }
}

impl Catalog for SqliteCatalog {
    fn champions(&self, filter: &ChampionFilter) -> Result<Vec<ChampionSummary>, CatalogError> {
        let connection = self.connect()?;
        let sql = format!(
            "SELECT c.id, c.name, c.cost, c.icon, c.stats, c.ability {CHAMPION_FILTER_SQL}
             ORDER BY c.id"
        );
        let mut statement = connection
            .prepare(&sql)
            .map_err(query_error("prepare champion listing"))?;
        let mut rows = statement
            .query(params![filter.trait_name, filter.cost, filter.set])
            .map_err(query_error("list champions"))?;

        let mut trait_names = champion_trait_names(&connection)?;
        let mut champions = Vec::new();
        while let Some(row) = rows.next().map_err(query_error("read champion row"))? {
            let id: i64 = column(row, 0, "read champion id")?;
            champions.push(ChampionSummary {
                id,
                name: column(row, 1, "read champion name")?,
                cost: column(row, 2, "read champion cost")?,
                icon: column(row, 3, "read champion icon")?,
                traits: trait_names.remove(&id).unwrap_or_default(),
                stats: blob_column(row, 4, "champions", "stats", id)?,
                ability: blob_column(row, 5, "champions", "ability", id)?,
            });
        }
        debug!("listed {} champions for {filter:?}", champions.len());
        Ok(champions)
    }

    fn champion_by_name(&self, name: &str) -> Result<Option<ChampionDetail>, CatalogError> {
        let connection = self.connect()?;
        let Some(champion_id) = find_champion_id(&connection, name)? else {
            debug!("no champion named {name:?}");
            return Ok(None);
        };

        let mut statement = connection
            .prepare(
                "SELECT c.id, c.api_name, c.name, c.cost, c.role, c.icon, c.square_icon,
                        s.name, c.stats, c.ability
                 FROM champions AS c
                 JOIN set_data AS s ON s.id = c.set_data_id
                 WHERE c.id = ?1",
            )
            .map_err(query_error("prepare champion lookup"))?;
        let mut rows = statement
            .query([champion_id])
            .map_err(query_error("look up champion"))?;
        let Some(row) = rows.next().map_err(query_error("read champion row"))? else {
            return Ok(None);
        };

        let id: i64 = column(row, 0, "read champion id")?;
        Ok(Some(ChampionDetail {
            id,
            api_name: column(row, 1, "read champion api name")?,
            name: column(row, 2, "read champion name")?,
            cost: column(row, 3, "read champion cost")?,
            role: column(row, 4, "read champion role")?,
            icon: column(row, 5, "read champion icon")?,
            square_icon: column(row, 6, "read champion square icon")?,
            set_name: column(row, 7, "read champion set name")?,
            traits: trait_badges(&connection, id)?,
            stats: blob_column(row, 8, "champions", "stats", id)?,
            ability: blob_column(row, 9, "champions", "ability", id)?,
        }))
    }

    fn composition(
        &self,
        trait_name: &str,
        set: Option<&str>,
    ) -> Result<Composition, CatalogError> {
        let connection = self.connect()?;
        let sql = format!(
            "SELECT c.id, c.name, c.cost, c.icon {CHAMPION_FILTER_SQL}
             ORDER BY c.cost, c.id"
        );
        let mut statement = connection
            .prepare(&sql)
            .map_err(query_error("prepare composition"))?;
        let no_cost: Option<i64> = None;
        let mut rows = statement
            .query(params![trait_name, no_cost, set])
            .map_err(query_error("list composition members"))?;

        let links = champion_trait_links(&connection)?;
        let mut champions = Vec::new();
        let mut member_links = Vec::new();
        while let Some(row) = rows.next().map_err(query_error("read composition row"))? {
            let id: i64 = column(row, 0, "read champion id")?;
            let traits = links.get(&id).map(Vec::as_slice).unwrap_or_default();
            member_links.push(traits);
            champions.push(CompositionMember {
                id,
                name: column(row, 1, "read champion name")?,
                cost: column(row, 2, "read champion cost")?,
                icon: column(row, 3, "read champion icon")?,
                traits: traits.iter().map(|(name, _)| name.clone()).collect(),
            });
        }

        let synergies = tally_synergies(
            member_links
                .iter()
                .map(|traits| traits.iter().map(|(name, icon)| (name.as_str(), icon.as_deref()))),
        );
        debug!(
            "composition for {trait_name:?} has {} champions and {} synergies",
            champions.len(),
            synergies.len()
        );
        Ok(Composition {
            trait_name: trait_name.to_owned(),
            champions,
            synergies,
        })
    }

    fn traits(&self, set: Option<&str>) -> Result<Vec<TraitSummary>, CatalogError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(
                "SELECT t.id, t.name, t.description, t.icon, t.effects
                 FROM traits AS t
                 JOIN set_data AS s ON s.id = t.set_data_id
                 WHERE ?1 IS NULL OR s.name = ?1 OR s.mutator = ?1
                 ORDER BY t.id",
            )
            .map_err(query_error("prepare trait listing"))?;
        let mut rows = statement
            .query([set])
            .map_err(query_error("list traits"))?;

        let mut traits = Vec::new();
        while let Some(row) = rows.next().map_err(query_error("read trait row"))? {
            let id: i64 = column(row, 0, "read trait id")?;
            traits.push(TraitSummary {
                id,
                name: column(row, 1, "read trait name")?,
                description: column(row, 2, "read trait description")?,
                icon: column(row, 3, "read trait icon")?,
                effects: blob_column(row, 4, "traits", "effects", id)?,
            });
        }
        Ok(traits)
    }

    fn items(&self) -> Result<Vec<ItemSummary>, CatalogError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(
                "SELECT id, name, description, icon, is_unique, composition, effects
                 FROM items ORDER BY id",
            )
            .map_err(query_error("prepare item listing"))?;
        let mut rows = statement.query([]).map_err(query_error("list items"))?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().map_err(query_error("read item row"))? {
            let id: i64 = column(row, 0, "read item id")?;
            items.push(ItemSummary {
                id,
                name: column(row, 1, "read item name")?,
                description: column(row, 2, "read item description")?,
                icon: column(row, 3, "read item icon")?,
                is_unique: column(row, 4, "read item uniqueness")?,
                composition: blob_column(row, 5, "items", "composition", id)?,
                effects: blob_column(row, 6, "items", "effects", id)?,
            });
        }
        Ok(items)
    }

    fn augments(&self, filter: &AugmentFilter) -> Result<Vec<AugmentSummary>, CatalogError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(
                "SELECT id, name, description, icon, tier, is_unique, effects, associated_traits
                 FROM augments
                 WHERE ?1 IS NULL OR tier = ?1
                 ORDER BY id",
            )
            .map_err(query_error("prepare augment listing"))?;
        let mut rows = statement
            .query([filter.tier])
            .map_err(query_error("list augments"))?;

        let mut augments = Vec::new();
        while let Some(row) = rows.next().map_err(query_error("read augment row"))? {
            let id: i64 = column(row, 0, "read augment id")?;
            let associated_traits = blob_column(row, 7, "augments", "associated_traits", id)?;
            if let Some(needle) = filter.trait_name.as_deref()
                && !mentions_trait(associated_traits.as_ref(), needle)
            {
                continue;
            }
            let rank: i64 = column(row, 4, "read augment tier")?;
            augments.push(AugmentSummary {
                id,
                name: column(row, 1, "read augment name")?,
                description: column(row, 2, "read augment description")?,
                icon: column(row, 3, "read augment icon")?,
                tier: AugmentTier::try_from(rank)
                    .map_err(|source| CatalogError::CorruptTier { id, source })?,
                is_unique: column(row, 5, "read augment uniqueness")?,
                effects: blob_column(row, 6, "augments", "effects", id)?,
                associated_traits,
            });
        }
        Ok(augments)
    }

    fn sets(&self) -> Result<Vec<SetSummary>, CatalogError> {
        let connection = self.connect()?;
        let mut statement = connection
            .prepare(
                "SELECT s.id, s.name, s.mutator, s.set_number,
                        (SELECT COUNT(*) FROM champions WHERE set_data_id = s.id),
                        (SELECT COUNT(*) FROM traits WHERE set_data_id = s.id)
                 FROM set_data AS s
                 ORDER BY s.id",
            )
            .map_err(query_error("prepare set listing"))?;
        let mut rows = statement.query([]).map_err(query_error("list sets"))?;

        let mut sets = Vec::new();
        while let Some(row) = rows.next().map_err(query_error("read set row"))? {
            sets.push(SetSummary {
                id: column(row, 0, "read set id")?,
                name: column(row, 1, "read set name")?,
                mutator: column(row, 2, "read set mutator")?,
                set_number: column(row, 3, "read set number")?,
                champion_count: column(row, 4, "count set champions")?,
                trait_count: column(row, 5, "count set traits")?,
            });
        }
        Ok(sets)
    }
}

/// Id of the first champion whose display name equals `name` under Unicode
/// lowercase folding.
fn find_champion_id(connection: &Connection, name: &str) -> Result<Option<i64>, CatalogError> {
    let needle = name.to_lowercase();
    let mut statement = connection
        .prepare("SELECT id, name FROM champions ORDER BY id")
        .map_err(query_error("prepare champion name scan"))?;
    let mut rows = statement
        .query([])
        .map_err(query_error("scan champion names"))?;
    while let Some(row) = rows.next().map_err(query_error("read champion name"))? {
        let candidate: String = column(row, 1, "read champion name")?;
        if candidate.to_lowercase() == needle {
            return column(row, 0, "read champion id").map(Some);
        }
    }
    Ok(None)
}

/// True when any string in `traits` contains `needle`, ignoring ASCII case.
fn mentions_trait(traits: Option<&Blob>, needle: &str) -> bool {
    let needle = needle.to_ascii_lowercase();
    traits.is_some_and(|blob| {
        blob.string_entries()
            .any(|entry| entry.to_ascii_lowercase().contains(&needle))
    })
}

fn champion_trait_names(
    connection: &Connection,
) -> Result<HashMap<i64, Vec<String>>, CatalogError> {
    Ok(champion_trait_links(connection)?
        .into_iter()
        .map(|(id, traits)| (id, traits.into_iter().map(|(name, _)| name).collect()))
        .collect())
}

/// Trait `(name, icon)` pairs per champion id, ordered by trait name.
fn champion_trait_links(
    connection: &Connection,
) -> Result<HashMap<i64, Vec<(String, Option<String>)>>, CatalogError> {
    let mut statement = connection
        .prepare(
            "SELECT ct.champion_id, t.name, t.icon
             FROM champion_traits AS ct
             JOIN traits AS t ON t.id = ct.trait_id
             ORDER BY ct.champion_id, t.name",
        )
        .map_err(query_error("prepare trait links"))?;
    let mut rows = statement.query([]).map_err(query_error("list trait links"))?;

    let mut links: HashMap<i64, Vec<(String, Option<String>)>> = HashMap::new();
    while let Some(row) = rows.next().map_err(query_error("read trait link"))? {
        let champion_id: i64 = column(row, 0, "read linked champion")?;
        let name: String = column(row, 1, "read linked trait name")?;
        let icon: Option<String> = column(row, 2, "read linked trait icon")?;
        links.entry(champion_id).or_default().push((name, icon));
    }
    Ok(links)
}

fn trait_badges(connection: &Connection, champion_id: i64) -> Result<Vec<TraitBadge>, CatalogError> {
    let mut statement = connection
        .prepare(
            "SELECT t.name, t.icon, t.description
             FROM champion_traits AS ct
             JOIN traits AS t ON t.id = ct.trait_id
             WHERE ct.champion_id = ?1
             ORDER BY t.name",
        )
        .map_err(query_error("prepare champion traits"))?;
    let mut rows = statement
        .query([champion_id])
        .map_err(query_error("list champion traits"))?;

    let mut badges = Vec::new();
    while let Some(row) = rows.next().map_err(query_error("read champion trait"))? {
        badges.push(TraitBadge {
            name: column(row, 0, "read trait name")?,
            icon: column(row, 1, "read trait icon")?,
            description: column(row, 2, "read trait description")?,
        });
    }
    Ok(badges)
}

fn query_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> CatalogError {
    move |source| CatalogError::Query { operation, source }
}

fn column<T: rusqlite::types::FromSql>(
    row: &Row<'_>,
    index: usize,
    operation: &'static str,
) -> Result<T, CatalogError> {
    row.get(index).map_err(query_error(operation))
}

fn blob_column(
    row: &Row<'_>,
    index: usize,
    table: &'static str,
    name: &'static str,
    id: i64,
) -> Result<Option<Blob>, CatalogError> {
    let text: Option<String> = column(row, index, "read payload column")?;
    text.map(|text| {
        Blob::parse(&text).map_err(|source| CatalogError::CorruptBlob {
            table,
            column: name,
            id,
            source,
        })
    })
    .transpose()
}
