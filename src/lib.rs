//! Facade crate for the TFT reference data service.
//!
//! This crate re-exports the stored record and view types, the offline
//! loader entry points, and (behind the `api` feature) the HTTP router.

#![forbid(unsafe_code)]

pub use tft_core::{
    AugmentFilter, AugmentSummary, AugmentTier, Catalog, CatalogError, ChampionDetail,
    ChampionFilter, ChampionSummary, Composition, ItemSummary, SCHEMA_VERSION, SetSummary,
    SqliteCatalog, Synergy, TraitSummary,
};

pub use tft_data::{
    FeedSource, FeedUrl, HttpFeedSource, LoadError, LoadOptions, LoadReport, load_feed,
    open_database, run_load,
};

#[cfg(feature = "api")]
pub use tft_api::{AppState, RouterOptions, create_router, serve};
