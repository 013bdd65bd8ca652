//! Launch attempt records
//!
//! One record is created per iteration of the supervisor's retry loop. Each
//! record owns a pair of log paths that no other attempt writes to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Log file paths of a single attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptLogs {
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

impl AttemptLogs {
    /// Allocate the log paths for attempt `index`
    ///
    /// Names combine the prefix, the attempt start time (millisecond
    /// resolution) and the attempt index, e.g.
    /// `api-20250101T120000123-attempt2.out.log`.
    pub fn allocate(
        log_dir: &Path,
        prefix: &str,
        index: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        let stamp = started_at.format("%Y%m%dT%H%M%S%3f");
        let stem = format!("{prefix}-{stamp}-attempt{index}");
        Self {
            stdout: log_dir.join(format!("{stem}.out.log")),
            stderr: log_dir.join(format!("{stem}.err.log")),
        }
    }
}

/// Why an attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The process could not be started at all
    SpawnFailed { message: String },
    /// The process exited before the port opened
    ExitedEarly { exit_code: Option<i32> },
    /// The port did not open within the readiness timeout
    ReadinessTimeout { waited_secs: u64 },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed { message } => write!(f, "could not start process: {message}"),
            Self::ExitedEarly {
                exit_code: Some(code),
            } => write!(f, "process exited early with code {code}"),
            Self::ExitedEarly { exit_code: None } => {
                write!(f, "process exited early (terminated by signal)")
            }
            Self::ReadinessTimeout { waited_secs } => {
                write!(f, "port not reachable after {waited_secs}s")
            }
        }
    }
}

/// Outcome of an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Pending,
    Succeeded,
    Failed { reason: FailureReason },
    /// Timed out and terminated by the supervisor
    Killed { reason: FailureReason },
}

impl AttemptOutcome {
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Killed { .. })
    }

    pub const fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Failed { reason } | Self::Killed { reason } => Some(reason),
            Self::Pending | Self::Succeeded => None,
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            Self::Killed { reason } => write!(f, "killed: {reason}"),
        }
    }
}

/// Record of one launch attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: Uuid,
    /// 1-based attempt index
    pub index: u32,
    pub started_at: DateTime<Utc>,
    pub logs: AttemptLogs,
    pub pid: Option<u32>,
    pub outcome: AttemptOutcome,
}

impl AttemptRecord {
    /// Start a new pending attempt, allocating fresh log paths
    pub fn begin(log_dir: &Path, prefix: &str, index: u32) -> Self {
        let started_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            index,
            started_at,
            logs: AttemptLogs::allocate(log_dir, prefix, index, started_at),
            pid: None,
            outcome: AttemptOutcome::Pending,
        }
    }
}
