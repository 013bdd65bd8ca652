use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Result of probing one external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    /// Role of the tool, e.g. "runtime"
    pub name: String,
    pub program: String,
    pub available: bool,
    /// First non-empty line the tool printed for its version flag
    pub version: Option<String>,
}

/// Runs a program with its version flag to check that it is installed
#[derive(Debug, Clone, Copy)]
pub struct ToolDetector {
    timeout: Duration,
}

impl Default for ToolDetector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ToolDetector {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Version flag for `program`; the JVM only understands a single dash
    pub fn version_flag(program: &str) -> &'static str {
        let stem = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program);
        if stem == "java" {
            "-version"
        } else {
            "--version"
        }
    }

    /// Probe `program`
    ///
    /// A tool that cannot be spawned, exits non-zero or exceeds the timeout
    /// is reported as unavailable.
    pub async fn detect(&self, name: &str, program: &str) -> ToolStatus {
        let unavailable = || ToolStatus {
            name: name.to_string(),
            program: program.to_string(),
            available: false,
            version: None,
        };

        let child = Command::new(program)
            .arg(Self::version_flag(program))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(program, error = %e, "tool not found");
                return unavailable();
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::debug!(program, error = %e, "tool failed to run");
                return unavailable();
            }
            Err(_) => {
                tracing::warn!(program, timeout_secs = self.timeout.as_secs(), "tool version check timed out");
                return unavailable();
            }
        };

        if !output.status.success() {
            tracing::debug!(program, status = %output.status, "tool version check failed");
            return unavailable();
        }

        let version = first_line(&output.stdout).or_else(|| first_line(&output.stderr));
        ToolStatus {
            name: name.to_string(),
            program: program.to_string(),
            available: true,
            version,
        }
    }
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
