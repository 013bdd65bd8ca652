//! Table output formatting for CLI commands
//!
//! Probe summaries, prerequisite reports and diagnosis findings using
//! comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::Diagnosis;
use crate::infrastructure::tools::ToolStatus;
use crate::services::ProbeReport;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
    /// Maximum width for tables (None = auto)
    max_width: Option<u16>,
}

impl TableFormatter {
    /// Create a new table formatter
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    /// Create a new table formatter with custom settings
    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    /// Summary of the endpoint probes
    pub fn format_probes(&self, report: &ProbeReport) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Endpoint").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Result").add_attribute(Attribute::Bold),
        ]);

        for result in &report.results {
            let status = result
                .status
                .map_or_else(|| "-".to_string(), |s| s.to_string());
            let outcome = result
                .error
                .as_deref()
                .map_or_else(|| "ok".to_string(), |e| truncate(e, 60));

            table.add_row(vec![
                Cell::new(&result.path),
                self.colored(status, result.is_success()),
                self.colored(outcome, result.is_success()),
            ]);
        }

        table.to_string()
    }

    /// Installed tools and their versions
    pub fn format_tools(&self, tools: &[&ToolStatus]) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Tool").add_attribute(Attribute::Bold),
            Cell::new("Program").add_attribute(Attribute::Bold),
            Cell::new("Available").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
        ]);

        for tool in tools {
            let available = if tool.available { "✓ yes" } else { "✗ no" };
            table.add_row(vec![
                Cell::new(&tool.name),
                Cell::new(&tool.program),
                self.colored(available.to_string(), tool.available),
                Cell::new(tool.version.as_deref().map_or_else(|| "-".to_string(), |v| truncate(v, 50))),
            ]);
        }

        table.to_string()
    }

    /// Matched diagnosis rules
    pub fn format_diagnosis(&self, diagnosis: &Diagnosis) -> String {
        let mut table = self.create_base_table();
        table.set_header(vec![
            Cell::new("Rule").add_attribute(Attribute::Bold),
            Cell::new("Diagnosis").add_attribute(Attribute::Bold),
        ]);

        if diagnosis.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new(diagnosis.to_string())]);
        }
        for finding in &diagnosis.findings {
            let rule = if self.use_colors {
                Cell::new(&finding.rule).fg(Color::Yellow)
            } else {
                Cell::new(&finding.rule)
            };
            table.add_row(vec![rule, Cell::new(&finding.message)]);
        }

        table.to_string()
    }

    fn colored(&self, text: String, ok: bool) -> Cell {
        if self.use_colors {
            Cell::new(text).fg(if ok { Color::Green } else { Color::Red })
        } else {
            Cell::new(text)
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();

        // Use UTF-8 preset for nice borders
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check for dumb terminal
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    true
}
