//! Optional SQL seed step
//!
//! Pipes the seed file into the database client. The password is read from
//! the terminal and handed to the client through its environment, never on
//! the command line.

use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

use crate::domain::models::SeedConfig;
use crate::domain::ports::CredentialPrompt;
use crate::infrastructure::tools::ToolDetector;

/// Environment variable the MySQL client reads its password from
const PASSWORD_ENV: &str = "MYSQL_PWD";

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read password: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Failed to open seed file: {0}")]
    SeedFile(#[source] std::io::Error),

    #[error("Failed to run `{program}`: {source}")]
    Client {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Database client exited with {code:?}: {stderr}")]
    ClientFailed { code: Option<i32>, stderr: String },

    #[error("Database client did not finish within {0}s")]
    Timeout(u64),
}

/// Result of the seed step; none of these stop the demo
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SeedOutcome {
    Loaded,
    Skipped(String),
    Failed(String),
}

/// Loads the SQL seed file through the database client
pub struct SeedLoader {
    config: SeedConfig,
    prompt: Arc<dyn CredentialPrompt>,
    detector: ToolDetector,
}

impl SeedLoader {
    pub fn new(config: SeedConfig, prompt: Arc<dyn CredentialPrompt>) -> Self {
        Self {
            config,
            prompt,
            detector: ToolDetector::default(),
        }
    }

    #[must_use]
    pub const fn with_detector(mut self, detector: ToolDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Client arguments; the password is not among them
    pub fn client_args(&self) -> Vec<String> {
        let mut args = vec![
            "-h".to_string(),
            self.config.host.clone(),
            "-P".to_string(),
            self.config.port.to_string(),
            "-u".to_string(),
            self.config.user.clone(),
        ];
        if let Some(database) = &self.config.database {
            args.push(database.clone());
        }
        args
    }

    /// Run the seed step
    pub async fn load(&self) -> SeedOutcome {
        let sql_file = &self.config.sql_file;
        if !sql_file.is_file() {
            return SeedOutcome::Skipped(format!(
                "seed file {} not found",
                sql_file.display()
            ));
        }

        let client = self
            .detector
            .detect("database client", &self.config.client_program)
            .await;
        if !client.available {
            return SeedOutcome::Skipped(format!(
                "database client `{}` is not installed",
                self.config.client_program
            ));
        }

        match self.run_client().await {
            Ok(()) => {
                tracing::info!(file = %sql_file.display(), "seed data loaded");
                SeedOutcome::Loaded
            }
            Err(e) => {
                tracing::warn!(error = %e, "seed step failed");
                SeedOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_client(&self) -> Result<(), SeedError> {
        let prompt = Arc::clone(&self.prompt);
        let label = format!("Password for {}@{}", self.config.user, self.config.host);
        let password = tokio::task::spawn_blocking(move || prompt.prompt_secret(&label))
            .await
            .map_err(|e| SeedError::Prompt(std::io::Error::other(e)))?
            .map_err(SeedError::Prompt)?;

        let seed = tokio::fs::File::open(&self.config.sql_file)
            .await
            .map_err(SeedError::SeedFile)?
            .into_std()
            .await;

        let child = Command::new(&self.config.client_program)
            .args(self.client_args())
            .env(PASSWORD_ENV, password)
            .stdin(Stdio::from(seed))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SeedError::Client {
                program: self.config.client_program.clone(),
                source,
            })?;

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, child.wait_with_output())
            .await
            .map_err(|_| SeedError::Timeout(self.config.timeout_secs))?
            .map_err(|source| SeedError::Client {
                program: self.config.client_program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(SeedError::ClientFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}
