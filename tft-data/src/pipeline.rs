//! The offline load: fetch the feed, plan the records, replace storage.
//!
//! Steps run strictly in order on one thread. The schema is checked before
//! the fetch, and a fetch or parse failure aborts the run before any stored
//! row is deleted. After that each persistence phase commits on its own.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::{info, warn};
use rusqlite::Connection;
use thiserror::Error;
use tft_core::{SchemaError, initialise_schema};
use tokio_util::sync::CancellationToken;

use crate::feed::{FeedError, FeedSource, RawFeed, fetch_feed};
use crate::fs::ensure_parent_dir;
use crate::store::{LoadReport, PersistError, persist_plan};
use crate::transform::{LoadOptions, plan_load};

/// Errors that end a load run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to create directory for database {path}: {source}")]
    CreateDir {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to open SQLite database at {path}")]
    Open {
        path: Utf8PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Open (creating if needed) the database a load writes to.
pub fn open_database(path: &Utf8Path) -> Result<Connection, LoadError> {
    ensure_parent_dir(path).map_err(|source| LoadError::CreateDir {
        path: path.to_path_buf(),
        source,
    })?;
    Connection::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Run a complete load from `source` into `connection`.
///
/// # Examples
/// ```no_run
/// use rusqlite::Connection;
/// use tft_data::feed::{FeedUrl, HttpFeedSource};
/// use tft_data::pipeline::run_load;
/// use tft_data::transform::LoadOptions;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = FeedUrl::new("https://raw.communitydragon.org/latest/cdragon/tft/", "en_us")?;
/// let source = HttpFeedSource::new(url)?;
/// let mut conn = Connection::open("tft.db")?;
/// let report = run_load(&source, &mut conn, &LoadOptions::default(), &CancellationToken::new())
///     .await?;
/// assert!(report.items > 0);
/// # Ok(())
/// # }
/// ```
pub async fn run_load<S: FeedSource + ?Sized>(
    source: &S,
    connection: &mut Connection,
    options: &LoadOptions,
    cancel: &CancellationToken,
) -> Result<LoadReport, LoadError> {
    info!("starting load of set revision {}", options.mutator);
    initialise_schema(connection)?;
    let feed = fetch_feed(source, cancel).await?;
    load_feed(connection, &feed, options)
}

/// Replace storage with the records planned from an already decoded feed.
pub fn load_feed(
    connection: &mut Connection,
    feed: &RawFeed,
    options: &LoadOptions,
) -> Result<LoadReport, LoadError> {
    let plan = plan_load(feed, options);
    let report = persist_plan(connection, &plan)?;
    log_report(&report);
    Ok(report)
}

fn log_report(report: &LoadReport) {
    info!(
        "load complete: {} items, {} augments, {} sets, {} traits, {} champions, {} trait links",
        report.items,
        report.augments,
        report.sets,
        report.traits,
        report.champions,
        report.champion_traits
    );
    let warnings = report.warnings;
    if warnings.missing_set || warnings.unresolved_traits > 0 || warnings.duplicates > 0 {
        warn!(
            "load finished with warnings: missing set = {}, unresolved trait references = {}, duplicates = {}",
            warnings.missing_set, warnings.unresolved_traits, warnings.duplicates
        );
    }
}
