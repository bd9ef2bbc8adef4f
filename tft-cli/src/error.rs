//! Error types emitted by the `tft` CLI.
//!
//! Keep this error type reasonably small; every command helper returns
//! `Result<_, CliError>`.

use std::{error::Error as StdError, io, net::SocketAddr, sync::Arc};

use thiserror::Error;
use tft_api::ServeError;
use tft_core::CatalogError;
use tft_data::feed::FeedUrlError;
use tft_data::{LoadError, TransportError};

/// Errors emitted by the `tft` CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option was blank after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The base URL or language did not form a valid feed URL.
    #[error(transparent)]
    InvalidFeedUrl(#[from] FeedUrlError),
    /// The listen address could not be parsed.
    #[error("invalid listen address {value:?}: {source}")]
    InvalidListenAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The global log subscriber could not be installed.
    #[error("failed to initialise logging: {source}")]
    InitLogging {
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The HTTP client for the feed could not be built.
    #[error("failed to build feed client: {0}")]
    BuildFeedSource(#[source] TransportError),
    /// The load run failed.
    #[error("load failed: {0}")]
    Load(#[from] Box<LoadError>),
    /// The catalog database could not be opened for serving.
    #[error(transparent)]
    OpenCatalog(#[from] CatalogError),
    /// Binding the listen address failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The HTTP server stopped with an error.
    #[error(transparent)]
    Serve(#[from] ServeError),
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        Self::Load(Box::new(err))
    }
}
