//! CLI layer
//!
//! Parses arguments, loads configuration, initialises logging and dispatches
//! to the command implementations.

pub mod commands;
pub mod console;
pub mod output;
pub mod reporter;
pub mod types;

use anyhow::Result;
use std::path::Path;

use crate::domain::error::StartupError;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

pub use types::{Cli, Commands};

/// Load configuration from `--config` or the project hierarchy
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Run the parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let config_file = cli.config.clone();
    let command = cli.resolved_command();

    // init writes the configuration, so it runs on defaults
    let config = if matches!(command, Commands::Init(_)) {
        Config::default()
    } else {
        load_config(config_file.as_deref())?
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;
    tracing::debug!(command = ?command, "dispatching");

    match command {
        Commands::Demo(args) => commands::demo::execute(args, &config).await,
        Commands::Up(args) => commands::up::execute(args, &config, json).await,
        Commands::Probe(args) => commands::probe::execute(args, &config, json).await,
        Commands::Doctor => commands::doctor::execute(&config, json).await,
        Commands::Diagnose(args) => commands::diagnose::execute(args, &config, json).await,
        Commands::Init(args) => commands::init::execute(args, json).await,
    }
}

/// Report a command error on the terminal
pub fn handle_error(err: &anyhow::Error, json_mode: bool) {
    let hint = err.downcast_ref::<StartupError>().and_then(StartupError::hint);

    if json_mode {
        let body = serde_json::json!({
            "error": format!("{err:#}"),
            "hint": hint,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        console::error(format!("{err:#}"));
        if let Some(hint) = hint {
            console::info(hint);
        }
    }
}
