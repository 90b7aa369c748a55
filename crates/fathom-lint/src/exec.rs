//! Deadline-enforced subprocess execution.
//!
//! Spawns the linter with piped output, drains stdout/stderr on reader
//! threads, and polls for exit until the deadline or caller cancellation.
//! A process that outlives its deadline is killed (SIGKILL on Unix) and
//! its pipes are drained with a short grace so the captured stderr can
//! ride along in the timeout error.

use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use fathom_core::error::LintError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const DRAIN_GRACE: Duration = Duration::from_millis(200);

/// Captured output of one subprocess run.
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

pub fn run_with_deadline(
    ctx: &CancellationToken,
    binary: &str,
    args: &[String],
    stdin_bytes: Option<&[u8]>,
    timeout: Duration,
) -> Result<ExecOutput, LintError> {
    if ctx.is_cancelled() {
        return Err(LintError::Canceled);
    }

    let mut command = Command::new(binary);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin_bytes.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    let mut child = command.spawn().map_err(|e| LintError::ExecFailed {
        linter: binary.to_string(),
        message: e.to_string(),
    })?;

    if let Some(bytes) = stdin_bytes {
        if let Some(mut stdin) = child.stdin.take() {
            // A linter that closes stdin early is not an error.
            let _ = stdin.write_all(bytes);
        }
    }

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let (exit_code, timed_out, canceled) = loop {
        match child.try_wait() {
            Ok(Some(status)) => break (status.code(), false, false),
            Ok(None) => {}
            Err(e) => {
                let _ = child.kill();
                return Err(LintError::ExecFailed {
                    linter: binary.to_string(),
                    message: e.to_string(),
                });
            }
        }
        if ctx.is_cancelled() {
            kill_and_reap(&mut child);
            break (None, false, true);
        }
        if Instant::now() >= deadline {
            kill_and_reap(&mut child);
            break (None, true, false);
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    // Drain the pipes; after a kill the readers finish within the grace.
    std::thread::sleep(if timed_out || canceled {
        DRAIN_GRACE
    } else {
        Duration::ZERO
    });
    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    if canceled {
        return Err(LintError::Canceled);
    }
    Ok(ExecOutput {
        stdout,
        stderr,
        exit_code,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    source: Option<R>,
) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut reader) = source {
            let _ = reader.read_to_string(&mut buffer);
        }
        buffer
    })
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
