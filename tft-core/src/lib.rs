//! Core domain types for the TFT reference data service.
//!
//! The records in [`model`] describe what the loader writes; the views in
//! [`catalog`] describe what the read API serves. Opaque feed payloads travel
//! between the two as [`Blob`] values and are never decomposed.
//!
//! The [`store`] module owns the SQLite schema shared by the loader and the
//! read side, together with the [`SqliteCatalog`] query implementation.
#![forbid(unsafe_code)]

pub mod blob;
pub mod catalog;
pub mod model;
pub mod store;

#[cfg(test)]
mod test_support;

pub use blob::Blob;
pub use catalog::{
    AugmentFilter, AugmentSummary, Catalog, CatalogError, ChampionDetail, ChampionFilter,
    ChampionSummary, Composition, CompositionMember, ItemSummary, SetSummary, Synergy,
    TraitBadge, TraitSummary,
};
pub use model::{
    AugmentRecord, AugmentTier, ChampionRecord, ItemRecord, SetRecord, TraitRecord,
    UnknownTierError,
};
pub use store::{SCHEMA_VERSION, SchemaError, SqliteCatalog, initialise_schema};
