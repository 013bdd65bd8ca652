//! Prerequisite detection
//!
//! Checks the runtime, the build tool and the database client before the demo
//! runs. Nothing here is fatal: the caller decides what a missing tool means.

use serde::Serialize;

use crate::domain::models::Config;
use crate::infrastructure::tools::{ToolDetector, ToolStatus};

/// Installed-tool report
#[derive(Debug, Clone, Serialize)]
pub struct PrerequisiteReport {
    pub runtime: ToolStatus,
    pub build_tool: ToolStatus,
    pub database_client: ToolStatus,
}

impl PrerequisiteReport {
    pub fn tools(&self) -> [&ToolStatus; 3] {
        [&self.runtime, &self.build_tool, &self.database_client]
    }

    pub fn all_available(&self) -> bool {
        self.tools().iter().all(|tool| tool.available)
    }

    /// Operator warnings for missing tools
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.runtime.available {
            warnings.push(format!(
                "`{}` not found: the service and the client cannot run",
                self.runtime.program
            ));
        }
        if !self.build_tool.available {
            warnings.push(format!(
                "`{}` not found: only a prebuilt artifact can be started",
                self.build_tool.program
            ));
        }
        if !self.database_client.available {
            warnings.push(format!(
                "`{}` not found: data seeding is unavailable",
                self.database_client.program
            ));
        }
        warnings
    }
}

/// Probe the three tools named in `config`
pub async fn check_prerequisites(detector: &ToolDetector, config: &Config) -> PrerequisiteReport {
    let (runtime, build_tool, database_client) = tokio::join!(
        detector.detect("runtime", &config.service.prebuilt.command.program),
        detector.detect("build tool", &config.service.build_and_serve.program),
        detector.detect("database client", &config.seed.client_program),
    );

    let report = PrerequisiteReport {
        runtime,
        build_tool,
        database_client,
    };
    for tool in report.tools() {
        tracing::debug!(
            tool = %tool.name,
            program = %tool.program,
            available = tool.available,
            version = ?tool.version,
            "prerequisite checked"
        );
    }
    report
}
