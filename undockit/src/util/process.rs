//! Engine subprocess execution.
//!
//! Two modes: captured (build, inspect, ps, run -d, stop) where the engine's
//! stdout/stderr are collected for parsing and diagnostics, and attached
//! (exec) where the engine inherits this process's stdio and its exit code
//! becomes ours.

use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Output, Stdio};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tokio::process::Command;
use tokio::select;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, warn};

use undockit_shared::errors::{UndockitError, UndockitResult};

/// Run an engine command to completion, capturing stdout and stderr.
///
/// Only a failure to spawn is an error here; callers decide what a nonzero
/// exit means for their operation.
pub(crate) async fn output(cmd: &mut Command) -> UndockitResult<Output> {
    debug!(command = ?cmd.as_std(), "Running engine command");
    cmd.stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| spawn_error(cmd, e))
}

/// Run an engine command attached to this process's stdio and return its
/// exit code.
///
/// While the child runs, SIGINT is swallowed (the terminal already delivers
/// it to the child, which shares our foreground process group) and
/// SIGTERM/SIGHUP are forwarded to the child.
pub(crate) async fn run_attached(mut cmd: Command) -> UndockitResult<i32> {
    debug!(command = ?cmd.as_std(), "Running attached engine command");

    let mut sig_int = signal(SignalKind::interrupt())?;
    let mut sig_term = signal(SignalKind::terminate())?;
    let mut sig_hup = signal(SignalKind::hangup())?;

    let mut child = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| spawn_error(&cmd, e))?;
    let pid = child.id().map(|id| Pid::from_raw(id as i32));

    let status = loop {
        select! {
            status = child.wait() => break status?,

            _ = sig_int.recv() => {
                debug!("SIGINT received, left to the engine process");
            }

            _ = sig_term.recv() => forward(pid, Signal::SIGTERM),

            _ = sig_hup.recv() => forward(pid, Signal::SIGHUP),
        }
    };

    Ok(exit_code(status))
}

/// Convert an exit status to a shell-style exit code.
///
/// Signal termination maps to `128 + signal`, e.g. SIGKILL -> 137.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(sig)) => 128 + sig,
        (None, None) => 1,
    }
}

/// Last stderr text of a failed command, for error messages.
pub(crate) fn stderr_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        format!("engine exited with {}", output.status)
    } else {
        stderr
    }
}

fn forward(pid: Option<Pid>, sig: Signal) {
    let Some(pid) = pid else {
        return;
    };
    debug!(pid = %pid, signal = ?sig, "Forwarding signal to engine process");
    if let Err(e) = kill(pid, sig) {
        warn!(pid = %pid, signal = ?sig, "Failed to forward signal: {}", e);
    }
}

fn spawn_error(cmd: &Command, e: std::io::Error) -> UndockitError {
    UndockitError::Engine(format!(
        "failed to run {}: {}",
        cmd.as_std().get_program().to_string_lossy(),
        e
    ))
}
