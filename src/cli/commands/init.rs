//! Implementation of the `runway init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if self.success {
            format!("{}\n  {}", self.message, self.config_path.display())
        } else {
            self.message.clone()
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Default configuration rendered as YAML
pub fn default_config_yaml() -> Result<String> {
    let yaml = serde_yaml::to_string(&Config::default())
        .context("Failed to serialize default configuration")?;
    Ok(format!(
        "# runway configuration\n# Environment variables override these values, e.g. RUNWAY_SERVICE__PORT=9090\n{yaml}"
    ))
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let config_path = ConfigLoader::project_config_path(&args.path);

    if config_path.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: format!(
                "{} already exists. Use --force to overwrite.",
                config_path.display()
            ),
            config_path,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    if let Some(dir) = config_path.parent() {
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    fs::write(&config_path, default_config_yaml()?)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "configuration written");

    output(
        &InitOutput {
            success: true,
            message: "Configuration written".to_string(),
            config_path,
        },
        json_mode,
    );
    Ok(())
}
