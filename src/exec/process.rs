// src/exec/process.rs

//! Running a single shell command with captured output and an optional
//! timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::directive::ResolvedCommand;
use crate::report::{Execution, ExecutionStatus};

/// How long a terminated process group gets to exit before it is killed.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// How long output readers may keep draining after the process is gone.
/// A background grandchild can hold the pipes open past its parent's exit;
/// once this runs out the rest of the process group is killed.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Options applied to every process spawned by a backend.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Working directory for the shell; inherits the runner's when `None`.
    pub working_dir: Option<PathBuf>,
}

/// Run `command` through the platform shell and capture its outcome.
///
/// Never fails: spawn and wait errors are folded into an [`Execution`] with
/// exit code `-1` and the error text on stderr, so one broken command never
/// takes down its siblings.
pub async fn run_shell(
    command: ResolvedCommand,
    timeout: Option<Duration>,
    options: &ProcessOptions,
) -> Execution {
    let started_at = Instant::now();
    match run_shell_inner(&command, timeout, options).await {
        Ok((status, stdout, stderr)) => Execution {
            command,
            status,
            stdout,
            stderr,
            started_at,
            elapsed: started_at.elapsed(),
        },
        Err(err) => {
            error!(cmd = %command.text, error = %err, "command execution error");
            Execution::failed_to_run(command, started_at, &format!("{err:#}"))
        }
    }
}

async fn run_shell_inner(
    command: &ResolvedCommand,
    timeout: Option<Duration>,
    options: &ProcessOptions,
) -> Result<(ExecutionStatus, Vec<u8>, Vec<u8>)> {
    debug!(cmd = %command.text, line = command.line, "starting process");
    let started = Instant::now();

    let mut cmd = shell_command(&command.text);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = &options.working_dir {
        cmd.current_dir(dir);
    }

    // Own process group, so a timeout can take down the whole pipeline.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning shell for '{}'", command.text))?;

    // Leader pid doubles as the process group id; `child.id()` is gone once
    // the leader has been reaped.
    let pgid = child.id();
    let mut stdout = Capture::spawn(child.stdout.take());
    let mut stderr = Capture::spawn(child.stderr.take());

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => exit_status(waited, command)?,
            Err(_) => {
                warn!(
                    cmd = %command.text,
                    timeout_ms = limit.as_millis() as u64,
                    "process timed out; terminating"
                );
                terminate(&mut child, command).await;
                ExecutionStatus::TimedOut(limit)
            }
        },
        None => exit_status(child.wait().await, command)?,
    };

    let (stdout_closed, stderr_closed) =
        tokio::join!(stdout.settle(DRAIN_GRACE), stderr.settle(DRAIN_GRACE));
    if !(stdout_closed && stderr_closed) {
        debug!(cmd = %command.text, "output pipes still open after exit; killing process group");
        kill_group(pgid, command);
    }
    let (stdout, stderr) = tokio::join!(stdout.finish(), stderr.finish());

    match status {
        ExecutionStatus::Exited(exit_code) => info!(
            cmd = %command.text,
            exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "process finished"
        ),
        ExecutionStatus::TimedOut(_) => info!(
            cmd = %command.text,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "process timed out"
        ),
    }
    Ok((status, stdout, stderr))
}

fn exit_status(
    waited: std::io::Result<std::process::ExitStatus>,
    command: &ResolvedCommand,
) -> Result<ExecutionStatus> {
    let status = waited.with_context(|| format!("waiting for '{}'", command.text))?;
    Ok(ExecutionStatus::Exited(status.code().unwrap_or(-1)))
}

/// Build a shell command appropriate for the platform.
pub fn shell_command(script: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(script);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(script);
        c
    }
}

/// Stop a timed-out process: SIGTERM to its group, then SIGKILL if it
/// lingers. Elsewhere the child is simply killed.
async fn terminate(child: &mut Child, command: &ResolvedCommand) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = child.id() {
            let pgrp = Pid::from_raw(pid as i32);
            if let Err(e) = killpg(pgrp, Signal::SIGTERM) {
                debug!(cmd = %command.text, error = %e, "SIGTERM to process group failed");
            }
            if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok() {
                return;
            }
            warn!(cmd = %command.text, "process ignored SIGTERM; killing");
            let _ = killpg(pgrp, Signal::SIGKILL);
        }
    }

    if let Err(e) = child.kill().await {
        debug!(cmd = %command.text, error = %e, "kill after timeout failed");
    }
}

/// SIGKILL whatever is left of a finished command's process group.
fn kill_group(pgid: Option<u32>, command: &ResolvedCommand) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Some(pid) = pgid {
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                debug!(cmd = %command.text, error = %e, "SIGKILL to process group failed");
            }
        }
    }
    #[cfg(not(unix))]
    let _ = (pgid, command);
}

/// Background reader that drains one output pipe into a shared buffer.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    handle: Option<JoinHandle<()>>,
}

impl Capture {
    fn spawn<R>(pipe: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = pipe.map(|mut pipe| {
            let buf = Arc::clone(&buf);
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk).await {
                        Ok(0) => break,
                        Ok(n) => {
                            if let Ok(mut guard) = buf.lock() {
                                guard.extend_from_slice(&chunk[..n]);
                            }
                        }
                        Err(e) => {
                            debug!(error = %e, "output pipe read failed");
                            break;
                        }
                    }
                }
            })
        });
        Self { buf, handle }
    }

    /// Wait up to `grace` for the reader to hit EOF. `false` if the pipe is
    /// still open.
    async fn settle(&mut self, grace: Duration) -> bool {
        if let Some(handle) = self.handle.as_mut() {
            if tokio::time::timeout(grace, handle).await.is_err() {
                return false;
            }
            self.handle = None;
        }
        true
    }

    /// Stop the reader (dropping the pipe) and return whatever was captured.
    async fn finish(mut self) -> Vec<u8> {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
        match self.buf.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}
