//! Offline loading of TFT reference data.
//!
//! Responsibilities:
//! - Fetch and decode the Community Dragon feed ([`feed`]).
//! - Select, classify, and filter feed records ([`transform`]).
//! - Replace the stored data in phases ([`store`], [`pipeline`]).
//!
//! Boundaries:
//! - Table definitions and read-side queries live in `tft-core`.
//! - Only the fetch is asynchronous; persistence uses blocking `rusqlite`.
//!
//! Invariants:
//! - A failed fetch or parse never deletes stored rows.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod feed;
pub mod fs;
pub mod pipeline;
pub mod store;
pub mod transform;

pub use feed::{FeedError, FeedSource, FeedUrl, HttpFeedSource, TransportError};
pub use pipeline::{LoadError, load_feed, open_database, run_load};
pub use store::{LoadReport, PersistError, persist_plan};
pub use transform::{DEFAULT_MUTATOR, LoadOptions, LoadPlan, plan_load};
