//! End-to-end startup scenarios with real child processes
#![cfg(unix)]

mod common;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use runway::domain::models::{
    AttemptLogs, AttemptOutcome, FailureReason, LaunchSpec, DOWNSTREAM_UNREACHABLE,
    UNCAUGHT_EXCEPTION,
};
use runway::domain::ports::{FailedAttempt, ServiceLauncher, ServiceProcess, StartupReporter};
use runway::infrastructure::network::TcpReadinessProbe;
use runway::infrastructure::process::ProcessLauncher;
use runway::services::{StartupOutcome, StartupRequest, StartupSupervisor, SupervisorSettings};
use runway::{Config, LaunchError, StartupError};

use common::{file_names, free_port, setup_test_logging, shell_service_config, temp_dir};

/// Wraps the real launcher and counts launches
#[derive(Default)]
struct CountingLauncher {
    inner: ProcessLauncher,
    launches: AtomicUsize,
}

#[async_trait]
impl ServiceLauncher for CountingLauncher {
    async fn launch(
        &self,
        spec: &LaunchSpec,
        logs: &AttemptLogs,
    ) -> Result<Box<dyn ServiceProcess>, LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.inner.launch(spec, logs).await
    }
}

#[derive(Default)]
struct CollectingReporter {
    failures: Mutex<Vec<FailedAttempt>>,
}

impl StartupReporter for CollectingReporter {
    fn attempt_failed(&self, failure: &FailedAttempt) {
        self.failures.lock().unwrap().push(failure.clone());
    }
}

fn supervisor_for(
    config: &Config,
    launcher: Arc<CountingLauncher>,
    reporter: Arc<CollectingReporter>,
) -> StartupSupervisor {
    StartupSupervisor::new(
        launcher,
        Arc::new(TcpReadinessProbe::new(config.supervisor.connect_timeout())),
        reporter,
    )
    .with_settings(SupervisorSettings::from_config(&config.supervisor))
}

#[tokio::test]
async fn single_attempt_that_never_opens_the_port() {
    setup_test_logging();
    let dir = temp_dir();
    let script = "echo booting; echo 'CommunicationsException: Communications link failure' >&2; sleep 30";
    let config = shell_service_config(dir.path(), script, free_port(), 1);
    let launcher = Arc::new(CountingLauncher::default());
    let reporter = Arc::new(CollectingReporter::default());
    let supervisor = supervisor_for(&config, launcher.clone(), reporter.clone());
    let request = StartupRequest::from_config(&config);

    let started = std::time::Instant::now();
    let err = supervisor
        .ensure_service_running(&request)
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(10));

    match err {
        StartupError::AttemptsExhausted {
            attempts,
            records,
            log_dir,
            ..
        } => {
            assert_eq!(attempts, 1);
            assert_eq!(records.len(), 1);
            assert_eq!(log_dir, dir.path().join("logs"));
            assert_eq!(
                records[0].outcome,
                AttemptOutcome::Killed {
                    reason: FailureReason::ReadinessTimeout { waited_secs: 1 }
                }
            );
        }
        other => panic!("expected AttemptsExhausted, got {other:?}"),
    }

    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    let files = file_names(&dir.path().join("logs"));
    assert_eq!(files.len(), 2, "one stdout and one stderr log: {files:?}");
    assert!(files.iter().any(|f| f.ends_with("-attempt1.out.log")));
    assert!(files.iter().any(|f| f.ends_with("-attempt1.err.log")));

    let failures = reporter.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].stdout_tail, vec!["booting"]);
    assert!(failures[0].diagnosis.has(DOWNSTREAM_UNREACHABLE));
}

#[tokio::test]
async fn early_exits_use_every_attempt_with_fresh_logs() {
    let dir = temp_dir();
    let script =
        "echo 'Exception in thread \"main\" java.lang.IllegalStateException: boom' >&2; exit 1";
    let config = shell_service_config(dir.path(), script, free_port(), 2);
    let launcher = Arc::new(CountingLauncher::default());
    let reporter = Arc::new(CollectingReporter::default());
    let supervisor = supervisor_for(&config, launcher.clone(), reporter.clone());

    let err = supervisor
        .ensure_service_running(&StartupRequest::from_config(&config))
        .await
        .unwrap_err();

    let StartupError::AttemptsExhausted { records, .. } = err else {
        panic!("expected AttemptsExhausted");
    };
    assert_eq!(records.len(), 2);
    for record in &records {
        assert_eq!(
            record.outcome,
            AttemptOutcome::Failed {
                reason: FailureReason::ExitedEarly { exit_code: Some(1) }
            }
        );
    }
    assert_ne!(records[0].logs.stdout, records[1].logs.stdout);
    assert_eq!(file_names(&dir.path().join("logs")).len(), 4);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);

    let failures = reporter.failures.lock().unwrap();
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().all(|f| f.diagnosis.has(UNCAUGHT_EXCEPTION)));
}

#[tokio::test]
async fn reachable_port_short_circuits() {
    let dir = temp_dir();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = shell_service_config(dir.path(), "exit 1", port, 3);
    let launcher = Arc::new(CountingLauncher::default());
    let supervisor = supervisor_for(&config, launcher.clone(), Arc::default());

    let outcome = supervisor
        .ensure_service_running(&StartupRequest::from_config(&config))
        .await;

    let outcome = tokio_test::assert_ok!(outcome);
    assert!(outcome.is_already_running());
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
    assert!(!dir.path().join("logs").exists());
}

#[tokio::test]
async fn port_opening_during_the_attempt_is_success() {
    let dir = temp_dir();
    let port = free_port();
    let mut config = shell_service_config(dir.path(), "echo started; sleep 30", port, 2);
    config.supervisor.readiness_timeout_secs = 5;
    let launcher = Arc::new(CountingLauncher::default());
    let supervisor = supervisor_for(&config, launcher.clone(), Arc::default());

    // Stand-in for the service binding its port a little after launch
    let binder = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(listener);
    });

    let outcome = supervisor
        .ensure_service_running(&StartupRequest::from_config(&config))
        .await
        .unwrap();

    let StartupOutcome::Started(service) = outcome else {
        panic!("service should have been started");
    };
    assert_eq!(service.record().index, 1);
    assert_eq!(service.record().outcome, AttemptOutcome::Succeeded);
    assert!(service.pid().is_some());
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);

    let stdout = service.record().logs.stdout.clone();
    service.stop(Duration::from_secs(2)).await;
    assert_eq!(std::fs::read_to_string(stdout).unwrap(), "started\n");
    binder.abort();
}

#[tokio::test]
async fn missing_build_tool_fails_every_attempt() {
    let dir = temp_dir();
    let mut config = shell_service_config(dir.path(), "", free_port(), 2);
    config.service.build_and_serve.program = "runway-missing-build-tool".to_string();
    let launcher = Arc::new(CountingLauncher::default());
    let reporter = Arc::new(CollectingReporter::default());
    let supervisor = supervisor_for(&config, launcher.clone(), reporter.clone());

    let err = supervisor
        .ensure_service_running(&StartupRequest::from_config(&config))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StartupError::AttemptsExhausted { attempts: 2, .. }
    ));
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 2);
    let failures = reporter.failures.lock().unwrap();
    assert!(failures.iter().all(|f| matches!(
        f.record.outcome.failure_reason(),
        Some(FailureReason::SpawnFailed { .. })
    )));
}
