//! Command-line interface for loading and serving TFT reference data.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod error;
mod load;
mod serve;

pub use error::CliError;

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_BASE_URL: &str = "base-url";
pub(crate) const ARG_LANGUAGE: &str = "language";
pub(crate) const ARG_MUTATOR: &str = "mutator";
pub(crate) const ARG_USER_AGENT: &str = "user-agent";
pub(crate) const ARG_LISTEN: &str = "listen";
pub(crate) const ARG_CORS: &str = "cors";
pub(crate) const ENV_LOAD_DATABASE: &str = "TFT_CMDS_LOAD_DATABASE";
pub(crate) const ENV_LOAD_MUTATOR: &str = "TFT_CMDS_LOAD_MUTATOR";
pub(crate) const ENV_LOAD_USER_AGENT: &str = "TFT_CMDS_LOAD_USER_AGENT";
pub(crate) const ENV_SERVE_DATABASE: &str = "TFT_CMDS_SERVE_DATABASE";

/// Database path used when none is configured.
pub const DEFAULT_DATABASE: &str = "tft.db";
/// Address the API binds when none is configured.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:8080";

/// Run the CLI with the current process arguments and environment.
pub async fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging()?;
    match cli.command {
        Command::Load(args) => {
            let config = args.into_config()?;
            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
            load::execute_load(&config, &cancel).await?;
        }
        Command::Serve(args) => {
            let config = args.into_config()?;
            serve::execute_serve(&config, shutdown_on_ctrl_c()).await?;
        }
    }
    Ok(())
}

/// Install the global `tracing` subscriber and bridge `log` records into it.
///
/// Verbosity comes from `RUST_LOG`, defaulting to `info`.
pub fn init_logging() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|source| CliError::InitLogging { source })
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("interrupt received; cancelling load");
            cancel.cancel();
        }
        Err(err) => warn!("failed to listen for interrupts: {err}"),
    }
}

async fn shutdown_on_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for interrupts: {err}");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tft",
    about = "Load and serve Teamfight Tactics reference data",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the stored data with the current Community Dragon feed.
    Load(load::LoadArgs),
    /// Serve the stored data over HTTP.
    Serve(serve::ServeArgs),
}

#[cfg(test)]
mod tests;
