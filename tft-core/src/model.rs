//! Records produced by the loader and written to the store.
//!
//! Records carry no database identifiers; the store assigns them on insert.
//! Champion records keep the display names of their traits so links can be
//! resolved once the trait rows exist.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Blob;

/// Identity of the single set revision kept by a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetRecord {
    /// Display name, e.g. `Set 16`.
    pub name: String,
    /// Machine-readable revision tag, e.g. `TFTSet16`.
    pub mutator: String,
    /// Numeric set identifier.
    pub set_number: i64,
}

/// A synergy tag scoped to the loaded set revision.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitRecord {
    /// Machine name, e.g. `TFT16_Yordle`.
    pub api_name: String,
    /// Display name; champions reference traits by this value.
    pub name: String,
    /// Optional tooltip text.
    pub description: Option<String>,
    /// Optional icon path.
    pub icon: Option<String>,
    /// Tier thresholds and effect values.
    pub effects: Option<Blob>,
}

/// A playable unit scoped to the loaded set revision.
#[derive(Debug, Clone, PartialEq)]
pub struct ChampionRecord {
    /// Machine name, e.g. `TFT16_Ahri`.
    pub api_name: String,
    /// Internal character name.
    pub character_name: String,
    /// Display name.
    pub name: String,
    /// Shop cost tier.
    pub cost: i64,
    /// Optional role tag.
    pub role: Option<String>,
    /// Full splash icon path.
    pub icon: Option<String>,
    /// Square portrait path.
    pub square_icon: Option<String>,
    /// Tile portrait path.
    pub tile_icon: Option<String>,
    /// Ability payload.
    pub ability: Option<Blob>,
    /// Stat payload.
    pub stats: Option<Blob>,
    /// Display names of the traits this champion carries, deduplicated.
    pub traits: Vec<String>,
}

/// A craftable item, independent of any set revision.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    /// Machine name; unique across all items.
    pub api_name: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional icon path.
    pub icon: Option<String>,
    /// Whether only one copy may be equipped.
    pub is_unique: bool,
    /// Machine names of the component items.
    pub composition: Option<Blob>,
    /// Effect values.
    pub effects: Option<Blob>,
    /// Traits the item is associated with.
    pub associated_traits: Option<Blob>,
    /// Traits the item cannot be combined with.
    pub incompatible_traits: Option<Blob>,
    /// Free-form tags.
    pub tags: Option<Blob>,
}

/// A draftable bonus, independent of any set revision.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentRecord {
    /// Machine name; unique across all augments.
    pub api_name: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional icon path.
    pub icon: Option<String>,
    /// Rarity tier derived from the icon path.
    pub tier: AugmentTier,
    /// Whether the augment may only be taken once.
    pub is_unique: bool,
    /// Effect values.
    pub effects: Option<Blob>,
    /// Traits the augment is associated with.
    pub associated_traits: Option<Blob>,
    /// Traits the augment cannot be combined with.
    pub incompatible_traits: Option<Blob>,
    /// Free-form tags.
    pub tags: Option<Blob>,
}

/// Augment rarity.
///
/// # Examples
/// ```
/// use tft_core::AugmentTier;
///
/// assert_eq!(AugmentTier::try_from(2).expect("known tier"), AugmentTier::Gold);
/// assert_eq!(AugmentTier::Prismatic.rank(), 3);
/// assert!(AugmentTier::try_from(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AugmentTier {
    /// Tier 1, the default.
    #[default]
    Silver,
    /// Tier 2.
    Gold,
    /// Tier 3.
    Prismatic,
}

impl AugmentTier {
    /// Numeric rank stored in the `tier` column.
    #[must_use]
    pub const fn rank(self) -> i64 {
        match self {
            Self::Silver => 1,
            Self::Gold => 2,
            Self::Prismatic => 3,
        }
    }
}

impl fmt::Display for AugmentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Prismatic => "prismatic",
        };
        f.write_str(label)
    }
}

impl From<AugmentTier> for i64 {
    fn from(tier: AugmentTier) -> Self {
        tier.rank()
    }
}

impl TryFrom<i64> for AugmentTier {
    type Error = UnknownTierError;

    fn try_from(rank: i64) -> Result<Self, Self::Error> {
        match rank {
            1 => Ok(Self::Silver),
            2 => Ok(Self::Gold),
            3 => Ok(Self::Prismatic),
            other => Err(UnknownTierError { rank: other }),
        }
    }
}

/// Raised when a stored tier falls outside `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("augment tier {rank} is outside the supported range 1..=3")]
pub struct UnknownTierError {
    /// Offending rank.
    pub rank: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AugmentTier::Silver, 1)]
    #[case(AugmentTier::Gold, 2)]
    #[case(AugmentTier::Prismatic, 3)]
    fn ranks_are_stable(#[case] tier: AugmentTier, #[case] rank: i64) {
        assert_eq!(tier.rank(), rank);
        assert_eq!(AugmentTier::try_from(rank), Ok(tier));
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    #[case(-1)]
    fn rejects_unknown_ranks(#[case] rank: i64) {
        assert_eq!(
            AugmentTier::try_from(rank),
            Err(UnknownTierError { rank })
        );
    }

    #[rstest]
    fn serialises_as_rank() {
        let encoded = serde_json::to_string(&AugmentTier::Gold).expect("serialise tier");
        assert_eq!(encoded, "2");
    }
}
