//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::path::Path;
use tempfile::TempDir;

use runway::domain::models::{CommandConfig, Config};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// A localhost port nothing is listening on
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Config whose service is a `sh -c` script run in `working_dir`
///
/// Timings are shortened so that a full failed attempt takes about a second.
pub fn shell_service_config(
    working_dir: &Path,
    script: &str,
    port: u16,
    max_attempts: u32,
) -> Config {
    let mut config = Config::default();
    config.service.host = "127.0.0.1".to_string();
    config.service.port = port;
    config.service.working_dir = working_dir.to_path_buf();
    config.service.build_and_serve = CommandConfig::new("sh", &["-c", script]);
    config.supervisor.max_attempts = max_attempts;
    config.supervisor.readiness_timeout_secs = 1;
    config.supervisor.poll_interval_ms = 50;
    config.supervisor.connect_timeout_ms = 100;
    config.supervisor.retry_delay_ms = 10;
    config.supervisor.kill_timeout_secs = 2;
    config
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Names of the files in `dir`, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
