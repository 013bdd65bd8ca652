//! Implementation of the default `runway` / `runway demo` command.
//!
//! Steps, in order: prerequisites, optional seed data, service startup,
//! endpoint probes, interactive client. Only a failed startup is fatal.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;

use super::probe::run_probes;
use super::up::ensure_running;
use crate::cli::console;
use crate::domain::models::Config;
use crate::infrastructure::credentials::TerminalPrompt;
use crate::infrastructure::tools::ToolDetector;
use crate::services::{check_prerequisites, ClientSession, SeedLoader, SeedOutcome, StartupOutcome};

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DemoArgs {
    /// Load the SQL seed data before starting the service
    #[arg(long)]
    pub load_data: bool,
}

pub async fn execute(args: DemoArgs, config: &Config) -> Result<()> {
    console::heading("Prerequisites");
    let detector = ToolDetector::default();
    let report = check_prerequisites(&detector, config).await;
    for tool in report.tools().into_iter().filter(|t| t.available) {
        console::success(format!(
            "{} `{}`: {}",
            tool.name,
            tool.program,
            tool.version.as_deref().unwrap_or("installed")
        ));
    }
    for warning in report.warnings() {
        console::warn(warning);
    }

    if args.load_data {
        console::heading("Seed data");
        let loader = SeedLoader::new(config.seed.clone(), Arc::new(TerminalPrompt))
            .with_detector(detector);
        match loader.load().await {
            SeedOutcome::Loaded => console::success("Seed data loaded"),
            SeedOutcome::Skipped(reason) => console::warn(format!("Seed step skipped: {reason}")),
            SeedOutcome::Failed(reason) => console::warn(format!("Seed step failed: {reason}")),
        }
    }

    console::heading("Service");
    let outcome = ensure_running(config, false).await?;
    let base_url = config.service.base_url();

    console::heading("Endpoint probes");
    match run_probes(config, &base_url, false).await {
        Ok(report) if report.failed() > 0 => console::warn(format!(
            "{} of {} endpoint probes failed",
            report.failed(),
            report.results.len()
        )),
        Ok(_) => console::success("All endpoint probes answered"),
        Err(e) => console::warn(format!("Endpoint probes skipped: {e:#}")),
    }

    if config.client.enabled {
        console::heading("Client");
        match ClientSession::new(config.client.clone()).run(&base_url).await {
            Ok(exit) if exit.success() => console::success("Client finished"),
            Ok(exit) => console::warn(format!("Client exited with {:?}", exit.code)),
            Err(e) => console::warn(format!("Client not started: {e}")),
        }
    }

    if let StartupOutcome::Started(service) = outcome {
        if config.client.stop_service_on_exit {
            service.stop(config.supervisor.kill_timeout()).await;
            console::success("Service stopped");
        } else {
            console::info(format!(
                "Service keeps running at {base_url} (pid {}); its output is no longer captured",
                service
                    .pid()
                    .map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
            ));
        }
    }

    Ok(())
}
