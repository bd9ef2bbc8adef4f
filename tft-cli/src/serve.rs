//! `tft serve`: expose the stored data over HTTP.

use std::{future::Future, net::SocketAddr};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tft_api::{AppState, RouterOptions, create_router, serve};
use tft_core::SqliteCatalog;
use tokio::net::TcpListener;

use crate::{
    ARG_CORS, ARG_DATABASE, ARG_LISTEN, CliError, DEFAULT_DATABASE, DEFAULT_LISTEN,
    ENV_SERVE_DATABASE,
};

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve the loaded reference data as a read-only JSON API. \
                 The database must already hold a load.",
    about = "Serve reference data over HTTP"
)]
#[ortho_config(prefix = "TFT")]
pub(crate) struct ServeArgs {
    /// Path to a database produced by `tft load`.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Socket address to listen on.
    #[arg(long = ARG_LISTEN, value_name = "addr")]
    #[serde(default)]
    pub(crate) listen: Option<String>,
    /// Allow cross-origin requests from any origin.
    #[arg(long = ARG_CORS, value_name = "bool", action = clap::ArgAction::Set)]
    #[serde(default)]
    pub(crate) cors: Option<bool>,
}

impl ServeArgs {
    pub(crate) fn into_config(self) -> Result<ServeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Resolved `serve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) listen: SocketAddr,
    pub(crate) cors: bool,
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = CliError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        if database.as_str().trim().is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_DATABASE,
                env: ENV_SERVE_DATABASE,
            });
        }
        let value = args.listen.unwrap_or_else(|| DEFAULT_LISTEN.to_owned());
        let listen = value
            .trim()
            .parse()
            .map_err(|source| CliError::InvalidListenAddress { value, source })?;
        Ok(Self {
            database,
            listen,
            cors: args.cors.unwrap_or(true),
        })
    }
}

pub(crate) async fn execute_serve<F>(config: &ServeConfig, shutdown: F) -> Result<(), CliError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let catalog = SqliteCatalog::open(config.database.as_std_path())?;
    let listener = TcpListener::bind(config.listen)
        .await
        .map_err(|source| CliError::Bind {
            addr: config.listen,
            source,
        })?;
    let router = create_router(AppState::new(catalog), RouterOptions { cors: config.cors });
    serve(listener, router, shutdown).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ServeConfig, CliError> {
    let merged = ServeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ServeConfig::try_from(merged)
}
