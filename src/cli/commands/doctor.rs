//! Implementation of the `runway doctor` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::Config;
use crate::infrastructure::tools::ToolDetector;
use crate::services::{check_prerequisites, PrerequisiteReport};

#[derive(Debug, Serialize)]
pub struct DoctorOutput {
    #[serde(flatten)]
    pub report: PrerequisiteReport,
    pub warnings: Vec<String>,
}

impl CommandOutput for DoctorOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![TableFormatter::new().format_tools(&self.report.tools())];
        for warning in &self.warnings {
            lines.push(format!("! {warning}"));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let report = check_prerequisites(&ToolDetector::default(), config).await;
    let warnings = report.warnings();
    output(&DoctorOutput { report, warnings }, json_mode);
    Ok(())
}
