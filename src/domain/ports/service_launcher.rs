use async_trait::async_trait;
use std::time::Duration;

use crate::domain::error::LaunchError;
use crate::domain::models::{AttemptLogs, LaunchPlan, LaunchSpec};

/// Exit information of a finished process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
}

/// Starts the service for one attempt
#[async_trait]
pub trait ServiceLauncher: Send + Sync {
    /// Resolve a launch plan from `spec` and start it detached
    ///
    /// Both log files in `logs` must exist once this returns `Ok`; the
    /// process output is drained into them until it exits.
    async fn launch(
        &self,
        spec: &LaunchSpec,
        logs: &AttemptLogs,
    ) -> Result<Box<dyn ServiceProcess>, LaunchError>;
}

/// Handle to a launched service process
#[async_trait]
pub trait ServiceProcess: Send {
    /// OS process id, if still known
    fn pid(&self) -> Option<u32>;

    /// The plan this process was started from
    fn plan(&self) -> &LaunchPlan;

    /// Non-blocking exit check
    fn try_exit(&mut self) -> Option<ProcessExit>;

    /// Hard-kill the process (and its group) and reap it within `wait`
    async fn terminate(&mut self, wait: Duration);

    /// Stop output draining; waits up to `wait` for the streams to close
    /// before cancelling the drain tasks, then joins them
    async fn finish_capture(&mut self, wait: Duration);
}
