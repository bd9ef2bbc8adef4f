//! `tft load`: fetch the feed and replace the stored data.

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tft_data::feed::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_USER_AGENT};
use tft_data::{
    DEFAULT_MUTATOR, FeedUrl, HttpFeedSource, LoadOptions, LoadReport, open_database, run_load,
};
use tokio_util::sync::CancellationToken;

use crate::{
    ARG_BASE_URL, ARG_DATABASE, ARG_LANGUAGE, ARG_MUTATOR, ARG_USER_AGENT, CliError,
    DEFAULT_DATABASE, ENV_LOAD_DATABASE, ENV_LOAD_MUTATOR, ENV_LOAD_USER_AGENT,
};

/// CLI arguments for the `load` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Download the Community Dragon TFT document, keep the configured \
                 set revision, and replace everything stored in the database. \
                 Options can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Load reference data from the Community Dragon feed"
)]
#[ortho_config(prefix = "TFT")]
pub(crate) struct LoadArgs {
    /// Path to the SQLite database to (re)build.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Directory URL holding the per-language feed documents.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Language code of the feed document, e.g. `en_us`.
    #[arg(long = ARG_LANGUAGE, value_name = "code")]
    #[serde(default)]
    pub(crate) language: Option<String>,
    /// Set revision tag to keep, e.g. `TFTSet16`.
    #[arg(long = ARG_MUTATOR, value_name = "tag")]
    #[serde(default)]
    pub(crate) mutator: Option<String>,
    /// `User-Agent` header sent with the feed request.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
}

impl LoadArgs {
    pub(crate) fn into_config(self) -> Result<LoadConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoadConfig::try_from(merged)
    }
}

/// Resolved `load` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) feed_url: FeedUrl,
    pub(crate) mutator: String,
    pub(crate) user_agent: String,
}

impl TryFrom<LoadArgs> for LoadConfig {
    type Error = CliError;

    fn try_from(args: LoadArgs) -> Result<Self, Self::Error> {
        let database = args
            .database
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        if database.as_str().trim().is_empty() {
            return Err(CliError::MissingArgument {
                field: ARG_DATABASE,
                env: ENV_LOAD_DATABASE,
            });
        }
        let feed_url = FeedUrl::new(
            args.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            args.language.as_deref().unwrap_or(DEFAULT_LANGUAGE),
        )?;
        let mutator = non_blank(args.mutator, DEFAULT_MUTATOR).ok_or(CliError::MissingArgument {
            field: ARG_MUTATOR,
            env: ENV_LOAD_MUTATOR,
        })?;
        let user_agent =
            non_blank(args.user_agent, DEFAULT_USER_AGENT).ok_or(CliError::MissingArgument {
                field: ARG_USER_AGENT,
                env: ENV_LOAD_USER_AGENT,
            })?;
        Ok(Self {
            database,
            feed_url,
            mutator,
            user_agent,
        })
    }
}

/// Apply `default` to an absent value; reject a value that is present but blank.
fn non_blank(value: Option<String>, default: &str) -> Option<String> {
    let value = value.unwrap_or_else(|| default.to_owned());
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

pub(crate) async fn execute_load(
    config: &LoadConfig,
    cancel: &CancellationToken,
) -> Result<LoadReport, CliError> {
    info!(
        "loading {} into {} (set revision {})",
        config.feed_url, config.database, config.mutator
    );
    let source = HttpFeedSource::new(config.feed_url.clone())
        .map_err(CliError::BuildFeedSource)?
        .with_user_agent(config.user_agent.clone());
    let mut connection = open_database(&config.database)?;
    let options = LoadOptions {
        mutator: config.mutator.clone(),
    };
    let report = run_load(&source, &mut connection, &options, cancel).await?;
    Ok(report)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LoadConfig, CliError> {
    let merged = LoadArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LoadConfig::try_from(merged)
}
