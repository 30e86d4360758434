//! Trial executor: launches the program under test and classifies the run.
//!
//! Each trial runs `<launcher> -np N [-hostfile H] <exe> <count> <in> <out>`
//! in its own process group, so a timeout or an interrupt can take down
//! every rank without touching the harness.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::time::timeout;

use crate::compare::compare_files;
use crate::error::{HarnessError, HarnessResult};
use crate::verdict::{ExitKind, OutputCheck, TrialRecord, classify};

/// Where the launcher's standard streams go
#[derive(Debug, Clone)]
pub enum StdioMode {
    /// Share the harness terminal
    Inherit,
    /// Redirect into per-trial files
    Capture { stdout: PathBuf, stderr: PathBuf },
}

/// Everything needed to run and check one trial
#[derive(Debug, Clone)]
pub struct Trial {
    /// Number of processes passed as `-np`
    pub processes: u32,
    /// Optional `-hostfile` argument
    pub hostfile: Option<PathBuf>,
    /// Program under test
    pub executable: PathBuf,
    /// Element count passed as the first program argument
    pub int_count: u64,
    /// Input file
    pub input: PathBuf,
    /// Where the program must write its result
    pub output: PathBuf,
    /// Known-correct sorted file
    pub reference: PathBuf,
    /// Stream handling
    pub stdio: StdioMode,
}

/// Runs trials one at a time under a fixed launcher and timeout
pub struct Executor {
    launcher: PathBuf,
    timeout: Duration,
}

impl Executor {
    /// Create a new executor
    pub fn new(launcher: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            launcher: launcher.into(),
            timeout,
        }
    }

    /// Build the launcher argv for a trial
    pub fn command_line(&self, trial: &Trial) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![
            self.launcher.clone().into(),
            "-np".into(),
            trial.processes.to_string().into(),
        ];
        if let Some(hostfile) = &trial.hostfile {
            argv.push("-hostfile".into());
            argv.push(hostfile.into());
        }
        argv.push(trial.executable.clone().into());
        argv.push(trial.int_count.to_string().into());
        argv.push(trial.input.clone().into());
        argv.push(trial.output.clone().into());
        argv
    }

    /// Run a trial to completion or timeout and classify it.
    ///
    /// Only a failure to start the launcher is an error; every outcome of
    /// the program itself becomes a verdict. Elapsed time runs from spawn
    /// until the output has been checked.
    pub async fn run(&self, trial: &Trial) -> HarnessResult<TrialRecord> {
        let argv = self.command_line(trial);
        let (exit, start) = self.execute(&argv, &trial.stdio).await?;

        let output = match exit {
            ExitKind::Success => Some(self.check_output(trial).await),
            _ => None,
        };

        let verdict = classify(exit, output);
        let elapsed = start.elapsed();
        tracing::debug!(
            verdict = %verdict,
            elapsed_ms = elapsed.as_millis() as u64,
            np = trial.processes,
            "Trial finished"
        );

        Ok(TrialRecord { verdict, elapsed })
    }

    /// Unreadable output counts against the program
    async fn check_output(&self, trial: &Trial) -> OutputCheck {
        match compare_files(&trial.output, &trial.reference).await {
            Ok(check) => check,
            Err(e) => {
                tracing::warn!(output = %trial.output.display(), "Cannot compare output: {}", e);
                OutputCheck::Differs
            }
        }
    }

    /// Spawn the launcher and wait for it; returns how it ended and when it started
    async fn execute(&self, argv: &[OsString], stdio: &StdioMode) -> HarnessResult<(ExitKind, Instant)> {
        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(Stdio::null())
            .process_group(0)
            .kill_on_drop(true);

        if let StdioMode::Capture { stdout, stderr } = stdio {
            command
                .stdout(Stdio::from(File::create(stdout)?))
                .stderr(Stdio::from(File::create(stderr)?));
        }

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| HarnessError::Spawn {
            program: argv[0].to_string_lossy().into_owned(),
            source,
        })?;

        // Dropping the guard (interrupt, timeout) kills every rank.
        let mut group = child.id().map(ProcessGroupGuard::new);
        tracing::debug!(pid = ?child.id(), "Launcher started");

        match timeout(self.timeout, child.wait()).await {
            Ok(status) => {
                if let Some(group) = group.as_mut() {
                    group.disarm();
                }
                Ok((exit_kind(status?), start))
            }
            Err(_) => {
                tracing::info!(timeout_secs = self.timeout.as_secs_f64(), "Trial timed out, killing process group");
                drop(group.take());
                if let Err(e) = child.kill().await {
                    tracing::debug!("Launcher already gone after group kill: {}", e);
                }
                Ok((ExitKind::TimedOut, start))
            }
        }
    }
}

fn exit_kind(status: ExitStatus) -> ExitKind {
    use std::os::unix::process::ExitStatusExt;

    match status.code() {
        Some(0) => ExitKind::Success,
        Some(code) => ExitKind::Failure(code),
        None => ExitKind::Failure(-status.signal().unwrap_or(0)),
    }
}

/// Sends SIGKILL to a process group when dropped, unless disarmed
struct ProcessGroupGuard {
    pgid: Pid,
    armed: bool,
}

impl ProcessGroupGuard {
    fn new(pid: u32) -> Self {
        Self {
            pgid: Pid::from_raw(pid as i32),
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = killpg(self.pgid, Signal::SIGKILL) {
                tracing::debug!(pgid = %self.pgid, "killpg failed: {}", e);
            }
        }
    }
}

/// Ensure `path` exists as an empty directory
pub async fn recreate_dir(path: &Path) -> HarnessResult<()> {
    if tokio::fs::try_exists(path).await? {
        tokio::fs::remove_dir_all(path).await?;
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Verdict;
    use std::os::unix::fs::PermissionsExt;

    /// Launcher stand-in that drops `-np`/`-hostfile` and runs the rest
    const FAKE_LAUNCHER: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -np|-hostfile) shift 2 ;;
    *) break ;;
  esac
done
exec "$@"
"#;

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    struct Fixture {
        dir: tempfile::TempDir,
        launcher: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let launcher = write_script(dir.path(), "fake_mpirun", FAKE_LAUNCHER);
            let data: Vec<u8> = (0u32..64).flat_map(|v| v.to_le_bytes()).collect();
            std::fs::write(dir.path().join("input"), &data).unwrap();
            std::fs::write(dir.path().join("sorted"), &data).unwrap();
            Self { dir, launcher }
        }

        fn trial(&self, program_body: &str) -> Trial {
            let executable = write_script(self.dir.path(), "program", program_body);
            Trial {
                processes: 4,
                hostfile: Some(self.dir.path().join("hostfile")),
                executable,
                int_count: 64,
                input: self.dir.path().join("input"),
                output: self.dir.path().join("output"),
                reference: self.dir.path().join("sorted"),
                stdio: StdioMode::Capture {
                    stdout: self.dir.path().join("stdout"),
                    stderr: self.dir.path().join("stderr"),
                },
            }
        }

        fn executor(&self, secs: f64) -> Executor {
            Executor::new(&self.launcher, Duration::from_secs_f64(secs))
        }
    }

    #[test]
    fn test_command_line_shape() {
        let executor = Executor::new("mpirun", Duration::from_secs(60));
        let mut trial = Trial {
            processes: 8,
            hostfile: Some(PathBuf::from("hostfile")),
            executable: PathBuf::from("./a.out"),
            int_count: 1024,
            input: PathBuf::from("in"),
            output: PathBuf::from("out"),
            reference: PathBuf::from("ref"),
            stdio: StdioMode::Inherit,
        };
        assert_eq!(
            executor.command_line(&trial),
            ["mpirun", "-np", "8", "-hostfile", "hostfile", "./a.out", "1024", "in", "out"]
        );

        trial.hostfile = None;
        assert_eq!(
            executor.command_line(&trial),
            ["mpirun", "-np", "8", "./a.out", "1024", "in", "out"]
        );
    }

    #[tokio::test]
    async fn test_copy_through_program_is_accepted() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\ncp \"$2\" \"$3\"\necho done\n");

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::Accepted);
        assert!(record.seconds() >= 0.0);

        let stdout = std::fs::read_to_string(fx.dir.path().join("stdout")).unwrap();
        assert_eq!(stdout, "done\n");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_runtime_error_even_with_correct_output() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\ncp \"$2\" \"$3\"\nexit 3\n");

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::RuntimeError { exit_code: 3 });
    }

    #[tokio::test]
    async fn test_signal_death_is_runtime_error() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\nkill -9 $$\n");

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::RuntimeError { exit_code: -9 });
    }

    #[tokio::test]
    async fn test_missing_output_is_no_output() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\nexit 0\n");

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::NoOutput);
    }

    #[tokio::test]
    async fn test_different_output_is_wrong_answer() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\nhead -c 4 \"$2\" > \"$3\"\n");

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::WrongAnswer);
    }

    #[tokio::test]
    async fn test_directory_in_place_of_output_is_wrong_answer() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\nmkdir \"$3\"\n");

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::WrongAnswer);
    }

    #[tokio::test]
    async fn test_elapsed_covers_output_check() {
        let fx = Fixture::new();
        let mut trial = fx.trial("#!/bin/sh\n: > \"$3\"\n");

        // Opening a fifo blocks until a writer shows up, so the check itself
        // takes at least as long as the writer waits.
        let fifo = fx.dir.path().join("sorted.fifo");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());
        trial.reference = fifo.clone();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(300));
            drop(std::fs::OpenOptions::new().write(true).open(&fifo).unwrap());
        });

        let record = fx.executor(10.0).run(&trial).await.unwrap();
        writer.join().unwrap();
        assert_eq!(record.verdict, Verdict::Accepted);
        assert!(record.elapsed >= Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_timeout_kills_process_group() {
        let fx = Fixture::new();
        let pid_file = fx.dir.path().join("sleeper.pid");
        let body = format!(
            "#!/bin/sh\nsleep 30 &\necho $! > '{}'\nwait\n",
            pid_file.display()
        );
        let trial = fx.trial(&body);

        let record = fx.executor(0.5).run(&trial).await.unwrap();
        assert_eq!(record.verdict, Verdict::TimedOut);
        assert!(record.elapsed < Duration::from_secs(10));

        // The backgrounded sleep shares the group and must be gone too.
        let pid: i32 = std::fs::read_to_string(&pid_file).unwrap().trim().parse().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!is_running(pid), "background rank survived the timeout");
    }

    /// A zombie counts as dead: it no longer runs, it only waits to be reaped.
    fn is_running(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.trim_start().chars().next())
                .is_some_and(|state| state != 'Z' && state != 'X'),
            Err(_) => false,
        }
    }

    #[tokio::test]
    async fn test_missing_launcher_is_fatal() {
        let fx = Fixture::new();
        let trial = fx.trial("#!/bin/sh\n");
        let executor = Executor::new("/nonexistent/mpirun", Duration::from_secs(1));

        let err = executor.run(&trial).await.unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_recreate_dir_empties_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("_out");
        std::fs::create_dir(&out).unwrap();
        std::fs::write(out.join("stale"), b"x").unwrap();

        recreate_dir(&out).await.unwrap();
        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }
}
