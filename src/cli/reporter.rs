//! Terminal rendering of startup progress

use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::console;
use super::output::{create_hidden_spinner, create_spinner, ProgressBarExt};
use crate::domain::models::{AttemptRecord, LaunchPath, LaunchPlan};
use crate::domain::ports::{FailedAttempt, StartupReporter};

/// Reports supervisor progress on stderr with a spinner per attempt
pub struct ConsoleReporter {
    spinner: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl ConsoleReporter {
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet: false,
        }
    }

    /// Reporter that draws nothing; used with `--json`
    pub const fn quiet() -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet: true,
        }
    }

    fn take_spinner(&self) -> Option<ProgressBar> {
        self.spinner.lock().ok().and_then(|mut guard| guard.take())
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StartupReporter for ConsoleReporter {
    fn already_running(&self, host: &str, port: u16) {
        if !self.quiet {
            console::success(format!("Service already reachable on {host}:{port}"));
        }
    }

    fn attempt_started(&self, record: &AttemptRecord, max_attempts: u32, plan: &LaunchPlan) {
        if self.quiet {
            return;
        }
        let how = match &plan.path {
            LaunchPath::Prebuilt { artifact } => format!("prebuilt {}", artifact.display()),
            LaunchPath::BuildAndServe => "build and serve".to_string(),
        };
        console::info(format!(
            "Attempt {}/{max_attempts}: starting service ({how}): {}",
            record.index,
            plan.command_line()
        ));
        console::info(format!(
            "Logs: {} / {}",
            record.logs.stdout.display(),
            record.logs.stderr.display()
        ));

        let spinner = create_spinner();
        spinner.set_message("waiting for the port to open");
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(spinner);
        }
    }

    fn waiting(&self, _record: &AttemptRecord, elapsed: Duration, timeout: Duration) {
        if let Ok(guard) = self.spinner.lock() {
            if let Some(spinner) = guard.as_ref() {
                spinner.set_message(format!(
                    "waiting for the port to open ({}s of {}s)",
                    elapsed.as_secs(),
                    timeout.as_secs()
                ));
            }
        }
    }

    fn attempt_failed(&self, failure: &FailedAttempt) {
        let spinner = self.take_spinner().unwrap_or_else(create_hidden_spinner);
        if self.quiet {
            spinner.finish_and_clear();
            return;
        }
        spinner.finish_error(format!(
            "Attempt {} {}",
            failure.record.index, failure.record.outcome
        ));

        console::log_tail(
            &failure.record.logs.stdout.display().to_string(),
            &failure.stdout_tail,
        );
        console::log_tail(
            &failure.record.logs.stderr.display().to_string(),
            &failure.stderr_tail,
        );
        for message in failure.diagnosis.messages() {
            console::warn(format!("Diagnosis: {message}"));
        }
    }

    fn service_ready(&self, record: &AttemptRecord) {
        let spinner = self.take_spinner().unwrap_or_else(create_hidden_spinner);
        if self.quiet {
            spinner.finish_and_clear();
            return;
        }
        spinner.finish_success(format!("Service ready (attempt {})", record.index));
    }

    fn gave_up(&self, attempts: u32, log_dir: &Path) {
        if !self.quiet {
            console::error(format!(
                "Service did not start after {attempts} attempt(s); see logs in {}",
                log_dir.display()
            ));
        }
    }
}
