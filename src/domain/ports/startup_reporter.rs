use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::domain::models::{AttemptRecord, Diagnosis, LaunchPlan};

/// Everything the operator sees about a failed attempt
#[derive(Debug, Clone, Serialize)]
pub struct FailedAttempt {
    pub record: AttemptRecord,
    pub stdout_tail: Vec<String>,
    pub stderr_tail: Vec<String>,
    pub diagnosis: Diagnosis,
}

/// Progress notifications emitted by the startup supervisor
///
/// All methods default to doing nothing.
pub trait StartupReporter: Send + Sync {
    fn already_running(&self, _host: &str, _port: u16) {}

    fn attempt_started(&self, _record: &AttemptRecord, _max_attempts: u32, _plan: &LaunchPlan) {}

    fn waiting(&self, _record: &AttemptRecord, _elapsed: Duration, _timeout: Duration) {}

    fn attempt_failed(&self, _failure: &FailedAttempt) {}

    fn service_ready(&self, _record: &AttemptRecord) {}

    fn gave_up(&self, _attempts: u32, _log_dir: &Path) {}
}

/// A reporter that discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl StartupReporter for NullReporter {}
