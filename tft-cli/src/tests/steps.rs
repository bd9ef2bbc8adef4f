//! Behaviour-driven step definitions for command configuration scenarios.

use super::*;
use crate::load::LoadConfig;
use crate::serve::ServeConfig;
use ortho_config::MergeComposer;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use std::cell::RefCell;

/// Collects the configuration layers and outcomes of one scenario.
#[derive(Debug, Default)]
struct ConfigWorld {
    file_layer: RefCell<Option<Value>>,
    env_layer: RefCell<Option<Value>>,
    cli_layer: RefCell<Option<Value>>,
    load_result: RefCell<Option<Result<LoadConfig, CliError>>>,
    serve_result: RefCell<Option<Result<ServeConfig, CliError>>>,
}

impl ConfigWorld {
    fn composer(&self) -> MergeComposer {
        let mut composer = MergeComposer::new();
        if let Some(layer) = self.file_layer.borrow().clone() {
            composer.push_file(layer, None);
        }
        if let Some(layer) = self.env_layer.borrow().clone() {
            composer.push_environment(layer);
        }
        composer.push_cli(self.cli_layer.borrow().clone().unwrap_or_else(|| json!({})));
        composer
    }
}

#[fixture]
fn world() -> ConfigWorld {
    ConfigWorld::default()
}

fn recorded_error<T: std::fmt::Debug>(result: &RefCell<Option<Result<T, CliError>>>) -> String {
    let borrowed = result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    format!("{error:?}")
}

#[given("no load configuration")]
fn no_configuration(#[from(world)] world: &ConfigWorld) {
    *world.file_layer.borrow_mut() = None;
    *world.env_layer.borrow_mut() = None;
    *world.cli_layer.borrow_mut() = None;
}

#[given("a config file that sets the database and the mutator")]
fn config_file_layer(#[from(world)] world: &ConfigWorld) {
    *world.file_layer.borrow_mut() = Some(json!({
        "database": "file.db",
        "mutator": "TFTSet15",
        "language": "fr_fr",
    }));
}

#[given("an environment that overrides the mutator")]
fn env_layer(#[from(world)] world: &ConfigWorld) {
    *world.env_layer.borrow_mut() = Some(json!({ "mutator": "TFTSet14" }));
}

#[given("CLI flags that override the database")]
fn cli_database(#[from(world)] world: &ConfigWorld) {
    *world.cli_layer.borrow_mut() = Some(json!({ "database": "cli.db" }));
}

#[given("CLI flags that set a blank mutator")]
fn cli_blank_mutator(#[from(world)] world: &ConfigWorld) {
    *world.cli_layer.borrow_mut() = Some(json!({ "mutator": " " }));
}

#[given("CLI flags that set the listen address to a host name")]
fn cli_host_name(#[from(world)] world: &ConfigWorld) {
    *world.cli_layer.borrow_mut() = Some(json!({ "listen": "localhost" }));
}

#[when("I resolve the load command")]
fn resolve_load(#[from(world)] world: &ConfigWorld) {
    let outcome = crate::load::config_from_layers_for_test(world.composer().layers());
    world.load_result.replace(Some(outcome));
}

#[when("I resolve the serve command")]
fn resolve_serve(#[from(world)] world: &ConfigWorld) {
    let outcome = crate::serve::config_from_layers_for_test(world.composer().layers());
    world.serve_result.replace(Some(outcome));
}

#[then("the load reads the en_us feed into tft.db for TFTSet16")]
fn load_uses_defaults(#[from(world)] world: &ConfigWorld) {
    let borrowed = world.load_result.borrow();
    let config = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    assert_eq!(config.database.as_str(), DEFAULT_DATABASE);
    assert!(config.feed_url.as_ref().ends_with("/en_us.json"));
    assert_eq!(config.mutator, tft_data::DEFAULT_MUTATOR);
}

#[then("CLI and environment layers override the config file")]
fn precedence_holds(#[from(world)] world: &ConfigWorld) {
    let borrowed = world.load_result.borrow();
    let config = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    assert_eq!(config.database.as_str(), "cli.db");
    assert_eq!(config.mutator, "TFTSet14");
    assert!(config.feed_url.as_ref().ends_with("/fr_fr.json"));
}

#[then("the CLI reports that the \"mutator\" option is missing")]
fn reports_missing_mutator(#[from(world)] world: &ConfigWorld) {
    let borrowed = world.load_result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_MUTATOR);
            assert_eq!(*env, ENV_LOAD_MUTATOR);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[then("the CLI reports an invalid listen address")]
fn reports_invalid_listen(#[from(world)] world: &ConfigWorld) {
    let message = recorded_error(&world.serve_result);
    assert!(
        message.starts_with("InvalidListenAddress"),
        "unexpected error {message}"
    );
}

macro_rules! register_config_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/configure_commands.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ConfigWorld) {
            let _ = world;
        }
    };
}

register_config_scenario!(load_defaults, "load falls back to built-in defaults");
register_config_scenario!(
    layering_cli_env_file,
    "layering CLI, environment, and config file values"
);
register_config_scenario!(rejecting_blank_mutator, "rejecting a blank mutator");
register_config_scenario!(
    rejecting_invalid_listen,
    "rejecting an invalid listen address"
);
