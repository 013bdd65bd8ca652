//! Interactive client session
//!
//! The client inherits the terminal; runway waits for it to exit.

use std::path::PathBuf;
use thiserror::Error;
use tokio::process::Command;

use crate::domain::models::{expand_args, ClientConfig};

/// Placeholder replaced by the service base URL in client arguments
pub const BASE_URL_PLACEHOLDER: &str = "{base_url}";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Client working directory {} does not exist", .0.display())]
    MissingWorkingDir(PathBuf),

    #[error("Failed to start client `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for client: {0}")]
    Wait(#[source] std::io::Error),
}

/// Exit of the client process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientExit {
    pub code: Option<i32>,
}

impl ClientExit {
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

/// Launches the interactive client against a base URL
pub struct ClientSession {
    config: ClientConfig,
}

impl ClientSession {
    pub const fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Client arguments with the base URL filled in
    pub fn arguments(&self, base_url: &str) -> Vec<String> {
        expand_args(&self.config.command.args, BASE_URL_PLACEHOLDER, base_url)
    }

    /// Run the client to completion with inherited stdio
    pub async fn run(&self, base_url: &str) -> Result<ClientExit, ClientError> {
        let working_dir = &self.config.working_dir;
        if !working_dir.is_dir() {
            return Err(ClientError::MissingWorkingDir(working_dir.clone()));
        }

        let program = &self.config.command.program;
        let args = self.arguments(base_url);
        tracing::info!(program = %program, args = ?args, "starting client");

        let mut child = Command::new(program)
            .args(&args)
            .current_dir(working_dir)
            .spawn()
            .map_err(|source| ClientError::Spawn {
                program: program.clone(),
                source,
            })?;

        let status = child.wait().await.map_err(ClientError::Wait)?;
        tracing::info!(status = %status, "client exited");
        Ok(ClientExit {
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CommandConfig;
    use tempfile::TempDir;

    #[test]
    fn test_base_url_placeholder_is_replaced() {
        let session = ClientSession::new(ClientConfig::default());
        assert_eq!(
            session.arguments("http://localhost:8080"),
            vec!["-jar", "target/cli.jar", "http://localhost:8080"]
        );
    }

    #[test]
    fn test_base_url_appended_without_placeholder() {
        let session = ClientSession::new(ClientConfig {
            command: CommandConfig::new("java", &["-jar", "cli.jar"]),
            ..ClientConfig::default()
        });
        assert_eq!(
            session.arguments("http://localhost:9090"),
            vec!["-jar", "cli.jar", "http://localhost:9090"]
        );
    }

    #[tokio::test]
    async fn test_missing_working_dir() {
        let dir = TempDir::new().unwrap();
        let session = ClientSession::new(ClientConfig {
            working_dir: dir.path().join("absent"),
            ..ClientConfig::default()
        });
        assert!(matches!(
            session.run("http://localhost:8080").await,
            Err(ClientError::MissingWorkingDir(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_reported() {
        let dir = TempDir::new().unwrap();
        let session = ClientSession::new(ClientConfig {
            working_dir: dir.path().to_path_buf(),
            command: CommandConfig::new("sh", &["-c", "test \"$0\" = http://x:1 || exit 3", "{base_url}"]),
            ..ClientConfig::default()
        });

        assert!(session.run("http://x:1").await.unwrap().success());
        assert_eq!(session.run("http://y:2").await.unwrap().code, Some(3));
    }
}
