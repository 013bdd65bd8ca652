//! Styled operator messages on stderr
//!
//! stdout is reserved for command output so that `--json` stays parseable.

use console::{style, Term};

fn line(text: &str) {
    if let Err(e) = Term::stderr().write_line(text) {
        tracing::debug!(error = %e, "failed to write to terminal");
    }
}

pub fn info(message: impl AsRef<str>) {
    line(&format!("{} {}", style("›").cyan().bold(), message.as_ref()));
}

pub fn success(message: impl AsRef<str>) {
    line(&format!("{} {}", style("✓").green().bold(), style(message.as_ref()).green()));
}

pub fn warn(message: impl AsRef<str>) {
    line(&format!("{} {}", style("!").yellow().bold(), style(message.as_ref()).yellow()));
}

pub fn error(message: impl AsRef<str>) {
    line(&format!("{} {}", style("✗").red().bold(), style(message.as_ref()).red().bold()));
}

/// Section heading
pub fn heading(title: impl AsRef<str>) {
    line(&format!("\n{}", style(title.as_ref()).bold().underlined()));
}

/// Indented, dimmed block of captured log lines
pub fn log_tail(label: &str, lines: &[String]) {
    line(&format!("  {}", style(label).dim().bold()));
    if lines.is_empty() {
        line(&format!("    {}", style("(empty)").dim()));
        return;
    }
    for text in lines {
        line(&format!("    {}", style(text).dim()));
    }
}
