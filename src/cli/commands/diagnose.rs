//! Implementation of the `runway diagnose` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::{Config, Diagnosis, DiagnosisRules};
use crate::infrastructure::process::last_lines;

#[derive(Args, Debug, Clone)]
pub struct DiagnoseArgs {
    /// Log files to scan
    #[arg(required = true)]
    pub logs: Vec<PathBuf>,

    /// Number of trailing lines to show per file
    #[arg(long, default_value_t = 50)]
    pub tail: usize,
}

#[derive(Debug, Serialize)]
pub struct FileDiagnosis {
    pub path: PathBuf,
    pub tail: Vec<String>,
    pub diagnosis: Diagnosis,
}

#[derive(Debug, Serialize)]
pub struct DiagnoseOutput {
    pub files: Vec<FileDiagnosis>,
    /// Diagnosis over all files together
    pub combined: Diagnosis,
}

impl CommandOutput for DiagnoseOutput {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for file in &self.files {
            lines.push(format!("==> {} <==", file.path.display()));
            lines.extend(file.tail.iter().cloned());
            lines.push(String::new());
        }
        lines.push(TableFormatter::new().format_diagnosis(&self.combined));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: DiagnoseArgs, config: &Config, json_mode: bool) -> Result<()> {
    let rules = DiagnosisRules::with_extra(&config.diagnosis.extra_rules)
        .context("Invalid diagnosis rule in configuration")?;

    let mut files = Vec::with_capacity(args.logs.len());
    let mut combined_text = String::new();
    for path in args.logs {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read log file {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        combined_text.push_str(&text);
        combined_text.push('\n');

        files.push(FileDiagnosis {
            tail: last_lines(&text, args.tail),
            diagnosis: rules.diagnose(&text),
            path,
        });
    }

    let combined = rules.diagnose(&combined_text);
    output(&DiagnoseOutput { files, combined }, json_mode);
    Ok(())
}
