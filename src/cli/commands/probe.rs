//! Implementation of the `runway probe` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Config;
use crate::services::{EndpointProber, ProbeReport};

#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Base URL of the service (defaults to the configured host and port)
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProbeOutput {
    #[serde(flatten)]
    pub report: ProbeReport,
}

impl CommandOutput for ProbeOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for result in &self.report.results {
            lines.push(format!("GET {}", result.url));
            if let Some(body) = &result.body {
                lines.push(serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string()));
            }
            if let Some(error) = &result.error {
                lines.push(format!("error: {error}"));
            }
            lines.push(String::new());
        }
        lines.push(TableFormatter::new().format_probes(&self.report));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run the configured probes against `base_url` and print the results
pub async fn run_probes(config: &Config, base_url: &str, json_mode: bool) -> Result<ProbeReport> {
    let prober = EndpointProber::new(
        base_url,
        config.probes.endpoints.clone(),
        config.probes.request_timeout(),
    )
    .context("Failed to create HTTP client")?;

    let report = prober.probe_all().await;
    let probe_output = ProbeOutput { report };
    output(&probe_output, json_mode);
    Ok(probe_output.report)
}

pub async fn execute(args: ProbeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.service.base_url());
    let report = run_probes(config, &base_url, json_mode).await?;

    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} endpoint probes failed",
            report.failed(),
            report.results.len()
        );
    }
    Ok(())
}
