use std::path::PathBuf;
use thiserror::Error;

use super::models::attempt::AttemptRecord;

/// Errors raised while launching a single service attempt
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned by the startup supervisor
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid startup request: {0}")]
    InvalidRequest(String),

    #[error("Failed to create log directory {}: {source}", path.display())]
    LogDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Service did not become reachable on {host}:{port} after {attempts} attempt(s); logs are in {}",
        log_dir.display()
    )]
    AttemptsExhausted {
        host: String,
        port: u16,
        attempts: u32,
        log_dir: PathBuf,
        records: Vec<AttemptRecord>,
    },
}

impl StartupError {
    /// Operator-facing hint for the error, if there is one
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::AttemptsExhausted { log_dir, .. } => Some(format!(
                "Inspect the attempt logs in {} and fix the reported cause before retrying",
                log_dir.display()
            )),
            Self::LogDirectory { .. } => {
                Some("Check that the service working directory is writable".to_string())
            }
            Self::InvalidRequest(_) => None,
        }
    }
}
