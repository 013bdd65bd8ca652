//! Implementation of the `runway up` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::console;
use crate::cli::output::{output, CommandOutput};
use crate::cli::reporter::ConsoleReporter;
use crate::domain::models::Config;
use crate::domain::ports::StartupReporter;
use crate::services::{StartupOutcome, StartupRequest, StartupSupervisor};

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct UpArgs {
    /// Exit once the service is ready instead of staying attached;
    /// its output is no longer captured after runway exits
    #[arg(long)]
    pub detach: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpStatus {
    AlreadyRunning,
    Started,
}

#[derive(Debug, Serialize)]
pub struct UpOutput {
    pub status: UpStatus,
    pub base_url: String,
    pub pid: Option<u32>,
    pub attempt: Option<u32>,
    pub stdout_log: Option<PathBuf>,
    pub stderr_log: Option<PathBuf>,
}

impl UpOutput {
    fn from_outcome(outcome: &StartupOutcome, base_url: String) -> Self {
        match outcome.started() {
            Some(service) => Self {
                status: UpStatus::Started,
                base_url,
                pid: service.pid(),
                attempt: Some(service.record().index),
                stdout_log: Some(service.record().logs.stdout.clone()),
                stderr_log: Some(service.record().logs.stderr.clone()),
            },
            None => Self {
                status: UpStatus::AlreadyRunning,
                base_url,
                pid: None,
                attempt: None,
                stdout_log: None,
                stderr_log: None,
            },
        }
    }
}

impl CommandOutput for UpOutput {
    fn to_human(&self) -> String {
        match self.status {
            UpStatus::AlreadyRunning => format!("Service already running at {}", self.base_url),
            UpStatus::Started => {
                let mut lines = vec![format!("Service started at {}", self.base_url)];
                if let Some(pid) = self.pid {
                    lines.push(format!("  pid:    {pid}"));
                }
                if let Some(attempt) = self.attempt {
                    lines.push(format!("  attempt: {attempt}"));
                }
                if let (Some(out), Some(err)) = (&self.stdout_log, &self.stderr_log) {
                    lines.push(format!("  stdout: {}", out.display()));
                    lines.push(format!("  stderr: {}", err.display()));
                }
                lines.join("\n")
            }
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Bring the service up, reporting progress on the terminal
pub async fn ensure_running(config: &Config, json_mode: bool) -> Result<StartupOutcome> {
    let reporter: Arc<dyn StartupReporter> = if json_mode {
        Arc::new(ConsoleReporter::quiet())
    } else {
        Arc::new(ConsoleReporter::new())
    };
    let supervisor = StartupSupervisor::from_config(config, reporter)
        .context("Invalid diagnosis rule in configuration")?;

    Ok(supervisor
        .ensure_service_running(&StartupRequest::from_config(config))
        .await?)
}

pub async fn execute(args: UpArgs, config: &Config, json_mode: bool) -> Result<()> {
    let outcome = ensure_running(config, json_mode).await?;
    output(
        &UpOutput::from_outcome(&outcome, config.service.base_url()),
        json_mode,
    );

    let StartupOutcome::Started(service) = outcome else {
        return Ok(());
    };
    if args.detach {
        if !json_mode {
            console::warn("Detached: service output is no longer captured once runway exits");
        }
        return Ok(());
    }

    if !json_mode {
        console::info("Press Ctrl-C to stop the service");
    }
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    service.stop(config.supervisor.kill_timeout()).await;
    if !json_mode {
        console::success("Service stopped");
    }
    Ok(())
}
