//! Turn a decoded feed into the records written by a load.
//!
//! Everything here is pure: the functions take the feed and options and
//! return a [`LoadPlan`] without touching storage. The rules are:
//!
//! - exactly one set revision is kept, chosen by its mutator tag;
//! - item-like records are augments when their icon path mentions
//!   `Augments`, otherwise items;
//! - items and augments survive only when their machine name appears in the
//!   kept revision's allow-list for their class;
//! - augment tiers come from `_III.` / `_II.` markers in the icon path;
//! - records with blank display names are dropped;
//! - champion trait references resolve by trait display name.

use std::collections::{HashMap, HashSet};

use log::{info, warn};
use tft_core::{
    AugmentRecord, AugmentTier, Blob, ChampionRecord, ItemRecord, SetRecord, TraitRecord,
};

use crate::feed::{RawChampion, RawFeed, RawItem, RawSetRevision, RawTrait};

/// Mutator tag of the set revision loaded when none is configured.
pub const DEFAULT_MUTATOR: &str = "TFTSet16";

const AUGMENT_ICON_MARKER: &str = "augments";

/// Options controlling which part of the feed is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Mutator tag of the set revision to keep, matched exactly.
    pub mutator: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mutator: DEFAULT_MUTATOR.to_owned(),
        }
    }
}

/// Records for the selected set revision.
#[derive(Debug, Clone, PartialEq)]
pub struct SetPlan {
    pub set: SetRecord,
    pub traits: Vec<TraitRecord>,
    /// Champions with their trait references already resolved.
    pub champions: Vec<ChampionRecord>,
}

/// Non-fatal problems noticed while planning a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanWarnings {
    /// The configured set revision was not in the feed.
    pub missing_set: bool,
    /// Champion trait references that matched no trait.
    pub unresolved_traits: usize,
    /// Records dropped because their machine or display name repeated.
    pub duplicates: usize,
}

/// Everything a load will write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadPlan {
    pub items: Vec<ItemRecord>,
    pub augments: Vec<AugmentRecord>,
    /// Absent when the configured revision is missing from the feed.
    pub set: Option<SetPlan>,
    pub warnings: PlanWarnings,
}

/// Build the load plan for `feed`.
///
/// # Examples
/// ```
/// use tft_data::feed::parse_feed;
/// use tft_data::transform::{LoadOptions, plan_load};
///
/// let mut bytes = br#"{
///     "items": [
///         {"apiName": "TFT_Item_BFSword", "name": "B.F. Sword", "icon": "Items/BFSword.tex"},
///         {"apiName": "TFT_Augment_Lotus", "name": "Lotus", "icon": "Augments/Lotus_III.tex"}
///     ],
///     "setData": [{
///         "mutator": "TFTSet16",
///         "items": ["tft_item_bfsword"],
///         "augments": ["TFT_Augment_Lotus"]
///     }]
/// }"#.to_vec();
/// let feed = parse_feed(&mut bytes).expect("parse feed");
/// let plan = plan_load(&feed, &LoadOptions::default());
/// assert_eq!(plan.items.len(), 1);
/// assert_eq!(plan.augments[0].tier.rank(), 3);
/// ```
#[must_use]
pub fn plan_load(feed: &RawFeed, options: &LoadOptions) -> LoadPlan {
    let mut warnings = PlanWarnings::default();
    let revision = select_revision(feed, &options.mutator);
    if revision.is_none() {
        warn!(
            "set revision {} not found in feed; skipping set, trait, and champion data",
            options.mutator
        );
        warnings.missing_set = true;
    }

    let (items, augments) = classify_items(&feed.items, revision, &mut warnings);
    let set = revision.map(|revision| plan_set(revision, &mut warnings));

    LoadPlan {
        items,
        augments,
        set,
        warnings,
    }
}

/// First revision whose mutator equals `mutator` exactly.
#[must_use]
pub fn select_revision<'a>(feed: &'a RawFeed, mutator: &str) -> Option<&'a RawSetRevision> {
    feed.set_data
        .iter()
        .find(|revision| revision.mutator == mutator)
}

/// True when the icon path marks the record as an augment.
///
/// This is a heuristic over asset paths rather than a flag carried by the
/// feed.
#[must_use]
pub fn is_augment(icon: Option<&str>) -> bool {
    icon.is_some_and(|icon| contains_ignore_ascii_case(icon, AUGMENT_ICON_MARKER))
}

/// Tier encoded in an augment icon path.
///
/// The markers are matched as plain substrings, so any path containing
/// `_III.` is prismatic even if the marker appears somewhere unexpected.
///
/// # Examples
/// ```
/// use tft_core::AugmentTier;
/// use tft_data::transform::augment_tier;
///
/// assert_eq!(
///     augment_tier(Some("ASSETS/UX/Augments/AugmentIcons_II.TFT_Set13.tex")),
///     AugmentTier::Gold
/// );
/// assert_eq!(augment_tier(None), AugmentTier::Silver);
/// ```
#[must_use]
pub fn augment_tier(icon: Option<&str>) -> AugmentTier {
    match icon {
        Some(icon) if contains_ignore_ascii_case(icon, "_iii.") => AugmentTier::Prismatic,
        Some(icon) if contains_ignore_ascii_case(icon, "_ii.") => AugmentTier::Gold,
        _ => AugmentTier::Silver,
    }
}

fn contains_ignore_ascii_case(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(lowercase_needle)
}

fn is_blank(name: &str) -> bool {
    name.trim().is_empty()
}

fn allow_list(names: &[String]) -> HashSet<String> {
    names.iter().map(|name| name.to_ascii_lowercase()).collect()
}

fn classify_items(
    raw_items: &[RawItem],
    revision: Option<&RawSetRevision>,
    warnings: &mut PlanWarnings,
) -> (Vec<ItemRecord>, Vec<AugmentRecord>) {
    let valid_items = revision.map(|revision| allow_list(&revision.items)).unwrap_or_default();
    let valid_augments = revision
        .map(|revision| allow_list(&revision.augments))
        .unwrap_or_default();
    info!(
        "allow-lists contain {} items and {} augments",
        valid_items.len(),
        valid_augments.len()
    );

    let mut items = Vec::new();
    let mut augments = Vec::new();
    let mut seen_items = HashSet::new();
    let mut seen_augments = HashSet::new();

    for raw in raw_items {
        if is_blank(&raw.name) {
            continue;
        }
        let key = raw.api_name.to_ascii_lowercase();
        if is_augment(raw.icon.as_deref()) {
            if !valid_augments.contains(&key) {
                continue;
            }
            if !seen_augments.insert(key) {
                warn!("dropping duplicate augment {}", raw.api_name);
                warnings.duplicates += 1;
                continue;
            }
            augments.push(augment_record(raw));
        } else {
            if !valid_items.contains(&key) {
                continue;
            }
            if !seen_items.insert(key) {
                warn!("dropping duplicate item {}", raw.api_name);
                warnings.duplicates += 1;
                continue;
            }
            items.push(item_record(raw));
        }
    }

    info!(
        "kept {} items and {} augments out of {} feed records",
        items.len(),
        augments.len(),
        raw_items.len()
    );
    (items, augments)
}

fn blob(value: Option<&serde_json::Value>) -> Option<Blob> {
    Blob::from_optional(value.cloned())
}

fn item_record(raw: &RawItem) -> ItemRecord {
    ItemRecord {
        api_name: raw.api_name.clone(),
        name: raw.name.clone(),
        description: raw.desc.clone(),
        icon: raw.icon.clone(),
        is_unique: raw.unique,
        composition: blob(raw.composition.as_ref()),
        effects: blob(raw.effects.as_ref()),
        associated_traits: blob(raw.associated_traits.as_ref()),
        incompatible_traits: blob(raw.incompatible_traits.as_ref()),
        tags: blob(raw.tags.as_ref()),
    }
}

fn augment_record(raw: &RawItem) -> AugmentRecord {
    AugmentRecord {
        api_name: raw.api_name.clone(),
        name: raw.name.clone(),
        description: raw.desc.clone(),
        icon: raw.icon.clone(),
        tier: augment_tier(raw.icon.as_deref()),
        is_unique: raw.unique,
        effects: blob(raw.effects.as_ref()),
        associated_traits: blob(raw.associated_traits.as_ref()),
        incompatible_traits: blob(raw.incompatible_traits.as_ref()),
        tags: blob(raw.tags.as_ref()),
    }
}

fn plan_set(revision: &RawSetRevision, warnings: &mut PlanWarnings) -> SetPlan {
    info!(
        "planning set {} ({}) with {} champions and {} traits",
        revision.name,
        revision.mutator,
        revision.champions.len(),
        revision.traits.len()
    );

    let traits: Vec<TraitRecord> = revision
        .traits
        .iter()
        .filter(|raw| !is_blank(&raw.name))
        .map(trait_record)
        .collect();

    let mut known_traits: HashMap<&str, &str> = HashMap::new();
    for record in &traits {
        if let Some(first) = known_traits.get(record.name.as_str()) {
            warn!(
                "trait name {} is shared by {} and {}; champions link to the first",
                record.name, first, record.api_name
            );
            warnings.duplicates += 1;
        } else {
            known_traits.insert(record.name.as_str(), record.api_name.as_str());
        }
    }

    let champions = revision
        .champions
        .iter()
        .filter(|raw| !is_blank(&raw.name))
        .map(|raw| champion_record(raw, &known_traits, warnings))
        .collect();

    SetPlan {
        set: SetRecord {
            name: revision.name.clone(),
            mutator: revision.mutator.clone(),
            set_number: revision.number,
        },
        traits,
        champions,
    }
}

fn trait_record(raw: &RawTrait) -> TraitRecord {
    TraitRecord {
        api_name: raw.api_name.clone(),
        name: raw.name.clone(),
        description: raw.desc.clone(),
        icon: raw.icon.clone(),
        effects: blob(raw.effects.as_ref()),
    }
}

fn champion_record(
    raw: &RawChampion,
    known_traits: &HashMap<&str, &str>,
    warnings: &mut PlanWarnings,
) -> ChampionRecord {
    let mut traits: Vec<String> = Vec::with_capacity(raw.traits.len());
    for reference in &raw.traits {
        if !known_traits.contains_key(reference.as_str()) {
            warn!("trait {reference} not found for champion {}", raw.name);
            warnings.unresolved_traits += 1;
        } else if !traits.contains(reference) {
            traits.push(reference.clone());
        }
    }

    ChampionRecord {
        api_name: raw.api_name.clone(),
        character_name: raw.character_name.clone(),
        name: raw.name.clone(),
        cost: raw.cost,
        role: raw.role.clone(),
        icon: raw.icon.clone(),
        square_icon: raw.square_icon.clone(),
        tile_icon: raw.tile_icon.clone(),
        ability: blob(raw.ability.as_ref()),
        stats: blob(raw.stats.as_ref()),
        traits,
    }
}
