//! Subprocess execution with a cleared environment and timeout enforcement

use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Runs an external tool with null stdin, drained pipes and a deadline
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    default_timeout: Duration,
    capture_limit: usize,
}

impl CommandExecutor {
    pub fn new(default_timeout: Duration, capture_limit: usize) -> Self {
        Self {
            default_timeout,
            capture_limit,
        }
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Execute `program` and capture its output
    ///
    /// stdout and stderr are drained on their own threads while the child
    /// runs, so a chatty tool cannot block on a full pipe. Captured output is
    /// cut at the capture limit; the rest is read and discarded.
    pub fn execute<S: AsRef<OsStr>>(
        &self,
        program: &Path,
        args: &[S],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput, CommandError> {
        let timeout_duration = timeout.unwrap_or(self.default_timeout);
        let start = Instant::now();
        let program_name = program.display().to_string();

        // Build command with sanitized environment
        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .env("PATH", "/usr/bin:/bin:/usr/sbin:/sbin")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            // Own process group, so wrapper scripts die with their children
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CommandError::ProgramNotFound {
                program: program_name.clone(),
            },
            std::io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                program: program_name.clone(),
            },
            _ => CommandError::ExecutionFailed {
                program: program_name.clone(),
                reason: e.to_string(),
            },
        })?;

        let stdout = child.stdout.take().map(|pipe| drain(pipe, self.capture_limit));
        let stderr = child.stderr.take().map(|pipe| drain(pipe, self.capture_limit));

        let waited = wait_timeout::ChildExt::wait_timeout(&mut child, timeout_duration);
        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                // Timeout - kill the whole group and reap. The drain threads
                // are left to finish on their own: a process that escaped the
                // group could hold the pipes open indefinitely.
                kill_group(child.id());
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::Timeout {
                    timeout_ms: timeout_duration.as_millis() as u64,
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CommandError::ExecutionFailed {
                    program: program_name,
                    reason: e.to_string(),
                });
            }
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        Ok(CommandOutput {
            stdout: stdout.text,
            stderr: stderr.text,
            truncated: stdout.truncated || stderr.truncated,
            exit_code: status.code().unwrap_or(-1),
            duration: start.elapsed(),
        })
    }
}

/// SIGKILL every process in the group led by `pid`
#[cfg(unix)]
fn kill_group(pid: u32) {
    let _ = Command::new("kill")
        .args(["-KILL", "--", &format!("-{}", pid)])
        .env_clear()
        .env("PATH", "/usr/bin:/bin:/usr/sbin:/sbin")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) {}

struct Captured {
    text: String,
    truncated: bool,
}

fn drain<R: Read + Send + 'static>(mut reader: R, limit: usize) -> JoinHandle<(Vec<u8>, bool)> {
    thread::spawn(move || {
        let mut captured = Vec::new();
        let mut truncated = false;
        let mut buffer = [0u8; 8192];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    let room = limit.saturating_sub(captured.len());
                    if n > room {
                        truncated = true;
                    }
                    captured.extend_from_slice(&buffer[..n.min(room)]);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        (captured, truncated)
    })
}

fn collect(handle: Option<JoinHandle<(Vec<u8>, bool)>>) -> Captured {
    let (bytes, truncated) = handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    Captured {
        text: String::from_utf8_lossy(&bytes).into_owned(),
        truncated,
    }
}

/// Command execution output
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Either stream exceeded the capture limit
    pub truncated: bool,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Command execution errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Program not found: {program}")]
    ProgramNotFound { program: String },

    #[error("Execution failed for '{program}': {reason}")]
    ExecutionFailed { program: String, reason: String },

    #[error("Command timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Permission denied: {program}")]
    PermissionDenied { program: String },
}
