//! Startup supervision of the dependent service
//!
//! Short-circuits when the port already accepts connections, otherwise runs a
//! bounded, strictly sequential retry loop. Every attempt gets its own pair of
//! log files; a failed attempt has its process group killed, its drains are
//! joined, and its logs are tailed and diagnosed before the next attempt
//! starts.

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

use crate::domain::error::StartupError;
use crate::domain::models::{
    AttemptOutcome, AttemptRecord, Config, DiagnosisRules, FailureReason, LaunchSpec,
    SupervisorConfig,
};
use crate::domain::ports::{
    FailedAttempt, ProcessExit, ReadinessProbe, ServiceLauncher, ServiceProcess, StartupReporter,
};
use crate::infrastructure::network::TcpReadinessProbe;
use crate::infrastructure::process::{read_log_text, tail_lines, ProcessLauncher};

/// What to bring up and how hard to try
#[derive(Debug, Clone)]
pub struct StartupRequest {
    pub host: String,
    pub port: u16,
    pub launch: LaunchSpec,
    pub max_attempts: u32,
    pub readiness_timeout: Duration,
    pub log_dir: PathBuf,
    pub log_prefix: String,
}

impl StartupRequest {
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.service.host.clone(),
            port: config.service.port,
            launch: LaunchSpec::from_config(&config.service),
            max_attempts: config.supervisor.max_attempts,
            readiness_timeout: config.supervisor.readiness_timeout(),
            log_dir: config.service.log_directory(),
            log_prefix: config.service.log_prefix.clone(),
        }
    }

    fn validate(&self) -> Result<(), StartupError> {
        if self.port == 0 {
            return Err(StartupError::InvalidRequest("port must be positive".into()));
        }
        if self.max_attempts == 0 {
            return Err(StartupError::InvalidRequest(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.readiness_timeout < Duration::from_secs(1) {
            return Err(StartupError::InvalidRequest(
                "readiness timeout must be at least 1 second".into(),
            ));
        }
        Ok(())
    }
}

/// Timing knobs of the retry loop
#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub poll_interval: Duration,
    pub retry_delay: Duration,
    pub retry_multiplier: f64,
    pub max_retry_delay: Duration,
    pub tail_lines: usize,
    pub kill_timeout: Duration,
    /// How long drains may run on after the process is gone
    pub drain_wait: Duration,
}

impl SupervisorSettings {
    pub fn from_config(config: &SupervisorConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            retry_delay: config.retry_delay(),
            retry_multiplier: config.retry_multiplier,
            max_retry_delay: config.max_retry_delay(),
            tail_lines: config.log_tail_lines,
            kill_timeout: config.kill_timeout(),
            drain_wait: config.kill_timeout(),
        }
    }

    fn retry_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry_delay)
            .with_multiplier(self.retry_multiplier)
            .with_randomization_factor(0.0)
            .with_max_interval(self.max_retry_delay)
            .with_max_elapsed_time(None)
            .build()
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self::from_config(&SupervisorConfig::default())
    }
}

/// Result of a successful `ensure_service_running`
#[derive(Debug)]
pub enum StartupOutcome {
    /// The port was already open; nothing was launched
    AlreadyRunning,
    /// An attempt of this run brought the service up
    Started(RunningService),
}

impl StartupOutcome {
    pub const fn is_already_running(&self) -> bool {
        matches!(self, Self::AlreadyRunning)
    }

    pub const fn started(&self) -> Option<&RunningService> {
        match self {
            Self::Started(service) => Some(service),
            Self::AlreadyRunning => None,
        }
    }
}

/// A service process launched and confirmed ready by the supervisor
///
/// Dropping it leaves the process running.
pub struct RunningService {
    record: AttemptRecord,
    process: Box<dyn ServiceProcess>,
}

impl RunningService {
    pub const fn record(&self) -> &AttemptRecord {
        &self.record
    }

    pub fn pid(&self) -> Option<u32> {
        self.process.pid()
    }

    /// Kill the service and join its log drains
    pub async fn stop(mut self, wait: Duration) {
        self.process.terminate(wait).await;
        self.process.finish_capture(wait).await;
    }
}

impl fmt::Debug for RunningService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningService")
            .field("record", &self.record)
            .field("pid", &self.process.pid())
            .finish()
    }
}

enum Readiness {
    Ready,
    Exited(ProcessExit),
    TimedOut,
}

/// Brings the dependent service up with bounded retries
pub struct StartupSupervisor {
    launcher: Arc<dyn ServiceLauncher>,
    probe: Arc<dyn ReadinessProbe>,
    reporter: Arc<dyn StartupReporter>,
    rules: DiagnosisRules,
    settings: SupervisorSettings,
}

impl StartupSupervisor {
    /// Create a supervisor with default settings and the built-in rules
    pub fn new(
        launcher: Arc<dyn ServiceLauncher>,
        probe: Arc<dyn ReadinessProbe>,
        reporter: Arc<dyn StartupReporter>,
    ) -> Self {
        Self {
            launcher,
            probe,
            reporter,
            rules: DiagnosisRules::builtin(),
            settings: SupervisorSettings::default(),
        }
    }

    /// Wire the OS process launcher and TCP probe from configuration
    ///
    /// # Errors
    /// Returns an error if a configured diagnosis pattern is not a valid regex
    pub fn from_config(
        config: &Config,
        reporter: Arc<dyn StartupReporter>,
    ) -> Result<Self, regex::Error> {
        let rules = DiagnosisRules::with_extra(&config.diagnosis.extra_rules)?;
        Ok(Self::new(
            Arc::new(ProcessLauncher::new()),
            Arc::new(TcpReadinessProbe::new(config.supervisor.connect_timeout())),
            reporter,
        )
        .with_rules(rules)
        .with_settings(SupervisorSettings::from_config(&config.supervisor)))
    }

    #[must_use]
    pub fn with_rules(mut self, rules: DiagnosisRules) -> Self {
        self.rules = rules;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SupervisorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Make sure the service accepts connections on `host:port`
    ///
    /// # Errors
    /// - `InvalidRequest` for a zero port, attempt budget or timeout
    /// - `LogDirectory` if the log directory cannot be created
    /// - `AttemptsExhausted` once every attempt has failed
    #[tracing::instrument(skip_all, fields(host = %request.host, port = request.port))]
    pub async fn ensure_service_running(
        &self,
        request: &StartupRequest,
    ) -> Result<StartupOutcome, StartupError> {
        request.validate()?;

        if self.probe.is_ready(&request.host, request.port).await {
            tracing::info!("service already reachable, nothing to launch");
            self.reporter.already_running(&request.host, request.port);
            return Ok(StartupOutcome::AlreadyRunning);
        }

        tokio::fs::create_dir_all(&request.log_dir)
            .await
            .map_err(|source| StartupError::LogDirectory {
                path: request.log_dir.clone(),
                source,
            })?;

        let mut backoff = self.settings.retry_backoff();
        let mut records = Vec::with_capacity(request.max_attempts as usize);

        for index in 1..=request.max_attempts {
            let mut record = AttemptRecord::begin(&request.log_dir, &request.log_prefix, index);

            let mut process = match self.launcher.launch(&request.launch, &record.logs).await {
                Ok(process) => process,
                Err(e) => {
                    tracing::warn!(attempt = index, error = %e, "launch failed");
                    record.outcome = AttemptOutcome::Failed {
                        reason: FailureReason::SpawnFailed {
                            message: e.to_string(),
                        },
                    };
                    self.report_failure(&record).await;
                    records.push(record);
                    self.pause_before_retry(index, request.max_attempts, &mut backoff)
                        .await;
                    continue;
                }
            };

            record.pid = process.pid();
            self.reporter.attempt_started(&record, request.max_attempts, process.plan());
            tracing::info!(
                attempt = index,
                max_attempts = request.max_attempts,
                pid = ?record.pid,
                "waiting for service readiness"
            );

            match self.await_readiness(request, &record, process.as_mut()).await {
                Readiness::Ready => {
                    record.outcome = AttemptOutcome::Succeeded;
                    tracing::info!(attempt = index, "service is ready");
                    self.reporter.service_ready(&record);
                    return Ok(StartupOutcome::Started(RunningService { record, process }));
                }
                Readiness::Exited(exit) => {
                    // group members may outlive the leader and hold the pipes open
                    process.terminate(self.settings.kill_timeout).await;
                    record.outcome = AttemptOutcome::Failed {
                        reason: FailureReason::ExitedEarly {
                            exit_code: exit.code,
                        },
                    };
                }
                Readiness::TimedOut => {
                    process.terminate(self.settings.kill_timeout).await;
                    record.outcome = AttemptOutcome::Killed {
                        reason: FailureReason::ReadinessTimeout {
                            waited_secs: request.readiness_timeout.as_secs(),
                        },
                    };
                }
            }

            process.finish_capture(self.settings.drain_wait).await;
            tracing::warn!(attempt = index, outcome = %record.outcome, "attempt failed");
            self.report_failure(&record).await;
            records.push(record);
            self.pause_before_retry(index, request.max_attempts, &mut backoff)
                .await;
        }

        self.reporter.gave_up(request.max_attempts, &request.log_dir);
        Err(StartupError::AttemptsExhausted {
            host: request.host.clone(),
            port: request.port,
            attempts: request.max_attempts,
            log_dir: request.log_dir.clone(),
            records,
        })
    }

    /// Poll until ready, early exit or the readiness timeout
    ///
    /// Exit status is checked before the port so that a crashed process is
    /// never mistaken for a ready one.
    async fn await_readiness(
        &self,
        request: &StartupRequest,
        record: &AttemptRecord,
        process: &mut dyn ServiceProcess,
    ) -> Readiness {
        let started = Instant::now();
        let poll = async {
            let mut ticker = tokio::time::interval(self.settings.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Some(exit) = process.try_exit() {
                    return Readiness::Exited(exit);
                }
                if self.probe.is_ready(&request.host, request.port).await {
                    return Readiness::Ready;
                }
                self.reporter
                    .waiting(record, started.elapsed(), request.readiness_timeout);
            }
        };

        tokio::time::timeout(request.readiness_timeout, poll)
            .await
            .unwrap_or(Readiness::TimedOut)
    }

    async fn report_failure(&self, record: &AttemptRecord) {
        let stdout_text = read_log_text(&record.logs.stdout).await;
        let stderr_text = read_log_text(&record.logs.stderr).await;
        let mut combined = stdout_text;
        combined.push('\n');
        combined.push_str(&stderr_text);

        let failure = FailedAttempt {
            record: record.clone(),
            stdout_tail: tail_lines(&record.logs.stdout, self.settings.tail_lines).await,
            stderr_tail: tail_lines(&record.logs.stderr, self.settings.tail_lines).await,
            diagnosis: self.rules.diagnose(&combined),
        };
        tracing::info!(
            attempt = record.index,
            diagnosis = %failure.diagnosis,
            "attempt diagnosed"
        );
        self.reporter.attempt_failed(&failure);
    }

    async fn pause_before_retry(
        &self,
        index: u32,
        max_attempts: u32,
        backoff: &mut ExponentialBackoff,
    ) {
        if index >= max_attempts {
            return;
        }
        let delay = backoff
            .next_backoff()
            .unwrap_or(self.settings.max_retry_delay);
        tracing::debug!(delay_ms = delay.as_millis(), "pausing before next attempt");
        tokio::time::sleep(delay).await;
    }
}
