//! Read-side views over the stored reference data.
//!
//! The [`Catalog`] trait is the seam between the HTTP layer and storage. Each
//! method is an independent, stateless read; implementations must not keep
//! mutable state between calls so that requests can run concurrently.

use std::{collections::BTreeMap, path::PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::{AugmentTier, Blob, UnknownTierError};

/// Filters accepted by [`Catalog::champions`]. Absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChampionFilter {
    /// Display name of a trait the champion must carry.
    pub trait_name: Option<String>,
    /// Exact cost tier.
    pub cost: Option<i64>,
    /// Set display name or mutator tag.
    pub set: Option<String>,
}

/// Filters accepted by [`Catalog::augments`]. Absent fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentFilter {
    /// Exact tier rank.
    pub tier: Option<i64>,
    /// Case-insensitive substring searched within the associated traits.
    pub trait_name: Option<String>,
}

/// Champion entry in a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionSummary {
    pub id: i64,
    pub name: String,
    pub cost: i64,
    pub icon: Option<String>,
    /// Trait display names, alphabetical.
    pub traits: Vec<String>,
    pub stats: Option<Blob>,
    pub ability: Option<Blob>,
}

/// Trait as shown on a champion detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitBadge {
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
}

/// Full champion record returned by a name lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionDetail {
    pub id: i64,
    pub api_name: String,
    pub name: String,
    pub cost: i64,
    pub role: Option<String>,
    pub icon: Option<String>,
    pub square_icon: Option<String>,
    /// Display name of the owning set.
    pub set_name: String,
    pub traits: Vec<TraitBadge>,
    pub stats: Option<Blob>,
    pub ability: Option<Blob>,
}

/// Champion carrying the trait a composition was requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionMember {
    pub id: i64,
    pub name: String,
    pub cost: i64,
    pub icon: Option<String>,
    pub traits: Vec<String>,
}

/// Number of composition members carrying a trait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Synergy {
    pub name: String,
    pub icon: Option<String>,
    pub count: usize,
}

/// Champions sharing a trait, with the synergies they activate together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    #[serde(rename = "trait")]
    pub trait_name: String,
    /// Ordered by ascending cost.
    pub champions: Vec<CompositionMember>,
    /// Ordered by descending count.
    pub synergies: Vec<Synergy>,
}

/// Trait entry in a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub effects: Option<Blob>,
}

/// Item entry in a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub is_unique: bool,
    pub composition: Option<Blob>,
    pub effects: Option<Blob>,
}

/// Augment entry in a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AugmentSummary {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub tier: AugmentTier,
    pub is_unique: bool,
    pub effects: Option<Blob>,
    pub associated_traits: Option<Blob>,
}

/// Set revision with derived counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSummary {
    pub id: i64,
    pub name: String,
    pub mutator: String,
    pub set_number: i64,
    pub champion_count: i64,
    pub trait_count: i64,
}

/// Read-only access to the loaded reference data.
///
/// Lookups that find nothing return `Ok(None)` or an empty list; errors are
/// reserved for storage failures and corrupt rows.
pub trait Catalog: Send + Sync {
    /// List champions matching every populated field of `filter`.
    fn champions(&self, filter: &ChampionFilter) -> Result<Vec<ChampionSummary>, CatalogError>;

    /// Find a champion by display name, ignoring ASCII case.
    fn champion_by_name(&self, name: &str) -> Result<Option<ChampionDetail>, CatalogError>;

    /// Build the composition for `trait_name`, optionally scoped to a set.
    fn composition(
        &self,
        trait_name: &str,
        set: Option<&str>,
    ) -> Result<Composition, CatalogError>;

    /// List traits, optionally scoped to a set.
    fn traits(&self, set: Option<&str>) -> Result<Vec<TraitSummary>, CatalogError>;

    /// List every item.
    fn items(&self) -> Result<Vec<ItemSummary>, CatalogError>;

    /// List augments matching every populated field of `filter`.
    fn augments(&self, filter: &AugmentFilter) -> Result<Vec<AugmentSummary>, CatalogError>;

    /// List set revisions with champion and trait counts.
    fn sets(&self) -> Result<Vec<SetSummary>, CatalogError>;
}

/// Errors raised by read-side queries.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// The database was not initialised with the expected schema.
    #[error("database at {path} has schema version {found:?}; expected {expected}")]
    SchemaMismatch {
        /// Location of the database on disk.
        path: PathBuf,
        /// Version this build understands.
        expected: i64,
        /// Version recorded in the database, if any.
        found: Option<i64>,
    },
    /// A query failed.
    #[error("failed to {operation}")]
    Query {
        /// Short description of the failed query.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored payload was not valid JSON.
    #[error("stored {table}.{column} for row {id} is not valid JSON")]
    CorruptBlob {
        /// Table holding the row.
        table: &'static str,
        /// Column holding the payload.
        column: &'static str,
        /// Row identifier.
        id: i64,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A stored augment tier was out of range.
    #[error("augment {id} has an invalid tier")]
    CorruptTier {
        /// Row identifier.
        id: i64,
        /// Range failure.
        #[source]
        source: UnknownTierError,
    },
}

/// Count how many champions carry each trait.
///
/// Each element of `links` lists one champion's traits as `(name, icon)`
/// pairs. The result is ordered by descending count, then by name. The first
/// icon seen for a name wins.
///
/// # Examples
/// ```
/// use tft_core::catalog::tally_synergies;
///
/// let links = [
///     vec![("Yordle", None), ("Sorcerer", None)],
///     vec![("Yordle", None)],
/// ];
/// let synergies = tally_synergies(links.iter().map(|traits| traits.iter().copied()));
/// assert_eq!(synergies[0].name, "Yordle");
/// assert_eq!(synergies[0].count, 2);
/// assert_eq!(synergies[1].count, 1);
/// ```
pub fn tally_synergies<'a, C, T>(links: C) -> Vec<Synergy>
where
    C: IntoIterator<Item = T>,
    T: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut tally: BTreeMap<&'a str, (Option<&'a str>, usize)> = BTreeMap::new();
    for champion in links {
        let mut seen: Vec<&str> = Vec::new();
        for (name, icon) in champion {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            let entry = tally.entry(name).or_insert((icon, 0));
            if entry.0.is_none() {
                entry.0 = icon;
            }
            entry.1 += 1;
        }
    }

    let mut synergies: Vec<Synergy> = tally
        .into_iter()
        .map(|(name, (icon, count))| Synergy {
            name: name.to_owned(),
            icon: icon.map(str::to_owned),
            count,
        })
        .collect();
    // BTreeMap iteration is already name-ordered; a stable sort keeps it.
    synergies.sort_by(|left, right| right.count.cmp(&left.count));
    synergies
}
