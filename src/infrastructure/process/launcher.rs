use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::fs::File;
use tokio::process::{Child, Command};

use super::artifact::find_artifact;
use super::log_drain::LogDrain;
use crate::domain::error::LaunchError;
use crate::domain::models::{AttemptLogs, LaunchPlan, LaunchSpec};
use crate::domain::ports::{ProcessExit, ServiceLauncher, ServiceProcess};

/// Launches the service as a detached OS process
///
/// On unix the child leads its own process group so that a build tool and
/// the JVM it forks can be killed together.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ServiceLauncher for ProcessLauncher {
    async fn launch(
        &self,
        spec: &LaunchSpec,
        logs: &AttemptLogs,
    ) -> Result<Box<dyn ServiceProcess>, LaunchError> {
        let artifact = find_artifact(
            &spec.working_dir,
            &spec.artifact_dir,
            &spec.artifact_extension,
        )
        .await;
        let plan = spec.plan(artifact);

        let stdout_file = create_log(&logs.stdout).await?;
        let stderr_file = create_log(&logs.stderr).await?;

        let mut command = Command::new(&plan.program);
        command
            .args(&plan.args)
            .current_dir(&plan.working_dir)
            .envs(&plan.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| LaunchError::Spawn {
            program: plan.program.clone(),
            source,
        })?;

        let mut drain = LogDrain::new();
        if let Some(stdout) = child.stdout.take() {
            drain.attach("stdout", stdout, stdout_file);
        }
        if let Some(stderr) = child.stderr.take() {
            drain.attach("stderr", stderr, stderr_file);
        }

        let pid = child.id();
        tracing::info!(
            pid = ?pid,
            command = %plan.command_line(),
            working_dir = %plan.working_dir.display(),
            "service process started"
        );

        Ok(Box::new(ChildProcess {
            child,
            pid,
            plan,
            drain: Some(drain),
        }))
    }
}

async fn create_log(path: &Path) -> Result<File, LaunchError> {
    File::create(path).await.map_err(|source| LaunchError::LogFile {
        path: path.to_path_buf(),
        source,
    })
}

/// A running service child with its output drains
pub struct ChildProcess {
    child: Child,
    pid: Option<u32>,
    plan: LaunchPlan,
    drain: Option<LogDrain>,
}

impl ChildProcess {
    #[cfg(unix)]
    fn kill_group(&self) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        let Some(pgid) = self.pid.and_then(|pid| i32::try_from(pid).ok()) else {
            return;
        };
        if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
            tracing::debug!(pgid, error = %e, "killpg failed");
        }
    }

    #[cfg(not(unix))]
    fn kill_group(&self) {}
}

#[async_trait]
impl ServiceProcess for ChildProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn plan(&self) -> &LaunchPlan {
        &self.plan
    }

    fn try_exit(&mut self) -> Option<ProcessExit> {
        match self.child.try_wait() {
            Ok(Some(status)) => Some(ProcessExit {
                code: status.code(),
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(pid = ?self.pid, error = %e, "failed to poll child status");
                None
            }
        }
    }

    async fn terminate(&mut self, wait: Duration) {
        self.kill_group();
        if let Err(e) = self.child.start_kill() {
            tracing::debug!(pid = ?self.pid, error = %e, "child already gone");
        }

        match tokio::time::timeout(wait, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(pid = ?self.pid, status = %status, "service process terminated");
            }
            Ok(Err(e)) => tracing::warn!(pid = ?self.pid, error = %e, "failed to reap child"),
            Err(_) => tracing::warn!(
                pid = ?self.pid,
                wait_secs = wait.as_secs(),
                "child did not exit after kill"
            ),
        }
    }

    async fn finish_capture(&mut self, wait: Duration) {
        if let Some(drain) = self.drain.take() {
            let bytes = drain.stop(wait).await;
            tracing::debug!(pid = ?self.pid, bytes, "log capture finished");
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::domain::models::config::{CommandConfig, ServiceConfig};
    use crate::domain::models::LaunchPath;
    use tempfile::TempDir;

    fn spec_for(dir: &Path, script: &str) -> LaunchSpec {
        let service = ServiceConfig {
            working_dir: dir.to_path_buf(),
            build_and_serve: CommandConfig::new("sh", &["-c", script]),
            ..ServiceConfig::default()
        };
        LaunchSpec::from_config(&service)
    }

    fn logs_in(dir: &Path) -> AttemptLogs {
        AttemptLogs {
            stdout: dir.join("svc.out.log"),
            stderr: dir.join("svc.err.log"),
        }
    }

    #[tokio::test]
    async fn test_output_is_drained_into_both_files() {
        let dir = TempDir::new().unwrap();
        let spec = spec_for(dir.path(), "echo booting; echo 'Address already in use' >&2");
        let logs = logs_in(dir.path());

        let mut process = ProcessLauncher::new().launch(&spec, &logs).await.unwrap();
        assert_eq!(process.plan().path, LaunchPath::BuildAndServe);

        let mut exit = None;
        for _ in 0..100 {
            exit = process.try_exit();
            if exit.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(exit, Some(ProcessExit { code: Some(0) }));
        process.finish_capture(Duration::from_secs(5)).await;

        assert_eq!(std::fs::read_to_string(&logs.stdout).unwrap(), "booting\n");
        assert_eq!(
            std::fs::read_to_string(&logs.stderr).unwrap(),
            "Address already in use\n"
        );
    }

    #[tokio::test]
    async fn test_terminate_kills_process_group() {
        let dir = TempDir::new().unwrap();
        let spec = spec_for(dir.path(), "sleep 30 & sleep 30");
        let logs = logs_in(dir.path());

        let mut process = ProcessLauncher::new().launch(&spec, &logs).await.unwrap();
        assert!(process.try_exit().is_none());

        process.terminate(Duration::from_secs(5)).await;
        assert!(process.try_exit().is_some());

        // The backgrounded sleep shared the pipes; killing the group closes them
        let started = std::time::Instant::now();
        process.finish_capture(Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let service = ServiceConfig {
            working_dir: dir.path().to_path_buf(),
            build_and_serve: CommandConfig::new("runway-no-such-program", &[]),
            ..ServiceConfig::default()
        };
        let spec = LaunchSpec::from_config(&service);

        let result = ProcessLauncher::new()
            .launch(&spec, &logs_in(dir.path()))
            .await;
        assert!(matches!(result, Err(LaunchError::Spawn { .. })));
        assert!(dir.path().join("svc.out.log").exists());
    }

    #[tokio::test]
    async fn test_prebuilt_artifact_is_preferred() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("target")).unwrap();
        std::fs::write(dir.path().join("target/app.jar"), b"").unwrap();

        let service = ServiceConfig {
            working_dir: dir.path().to_path_buf(),
            prebuilt: crate::domain::models::PrebuiltConfig {
                command: CommandConfig::new("sh", &["-c", "echo $0", "{artifact}"]),
                ..Default::default()
            },
            ..ServiceConfig::default()
        };
        let spec = LaunchSpec::from_config(&service);
        let logs = logs_in(dir.path());

        let mut process = ProcessLauncher::new().launch(&spec, &logs).await.unwrap();
        assert!(matches!(process.plan().path, LaunchPath::Prebuilt { .. }));
        process.terminate(Duration::from_secs(5)).await;
        process.finish_capture(Duration::from_secs(5)).await;
    }
}
