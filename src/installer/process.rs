//! Process execution with per-operation timeouts

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ProcessError {
    #[error("Failed to start {0}: {1}")]
    Spawn(String, String),

    #[error("Failed to wait on {0}: {1}")]
    Wait(String, String),

    #[error("{0} timed out after {1}s")]
    Timeout(String, u64),
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Command execution seam; mocked in tests
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError>;
}

/// Runs commands on the host with piped output and a kill-on-deadline loop
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, ProcessError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ProcessError::Spawn(program.to_string(), e.to_string()))?;

        // Drain the pipes off-thread so a chatty child cannot block on a
        // full pipe buffer while we poll for exit
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_handle = thread::spawn(move || read_all(stdout_pipe));
        let stderr_handle = thread::spawn(move || read_all(stderr_pipe));

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        child.kill().ok();
                        child.wait().ok();
                        return Err(ProcessError::Timeout(
                            program.to_string(),
                            timeout.as_secs(),
                        ));
                    }
                    thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(ProcessError::Wait(program.to_string(), e.to_string()));
                }
            }
        };

        let stdout = stdout_handle.join().unwrap_or_default();
        let stderr = stderr_handle.join().unwrap_or_default();

        Ok(CommandOutput {
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
        })
    }
}

fn read_all(pipe: Option<impl Read>) -> String {
    let mut buf = String::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_string(&mut buf).ok();
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn captures_exit_code_and_output() {
        let runner = SystemRunner;
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = runner.run("sh", &args, Duration::from_secs(10)).unwrap();

        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_is_success() {
        let runner = SystemRunner;
        let args = vec!["-c".to_string(), "true".to_string()];
        let output = runner.run("sh", &args, Duration::from_secs(10)).unwrap();
        assert!(output.success());
    }

    #[cfg(unix)]
    #[test]
    fn overrunning_command_is_killed() {
        let runner = SystemRunner;
        let args = vec!["-c".to_string(), "sleep 30".to_string()];
        let started = Instant::now();
        let err = runner
            .run("sh", &args, Duration::from_millis(300))
            .unwrap_err();

        assert!(matches!(err, ProcessError::Timeout(_, _)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_binary_is_a_spawn_error() {
        let runner = SystemRunner;
        let err = runner
            .run("definitely-not-a-real-binary", &[], Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn(_, _)));
    }
}
