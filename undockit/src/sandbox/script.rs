//! Startup script: exec helper deployment + idle reaper.
//!
//! ## Protocol
//!
//! ```text
//! exec helper (one per execution)        idle reaper (sandbox main process)
//! ─────────────────────────────          ─────────────────────────────────
//! touch pid/$$                           loop every poll_interval:
//! cd workdir                               count = entries in pid/
//! run "$@"                                 if count == 0 and
//! rm pid/$$ ; touch pid/                      now - mtime(pid/) > timeout:
//! exit with the command's code                 exit 0   (sandbox stops)
//! ```
//!
//! Creating or removing a marker refreshes the mtime of `pid/`, so the idle
//! window is always measured from the most recent execution start or end.
//! The helper also touches `pid/` after removing its marker, which keeps
//! that clock correct on filesystems that do not update a directory's mtime
//! on unlink.

use std::path::Path;

use undockit_shared::errors::{UndockitError, UndockitResult};
use undockit_shared::layout::SandboxLayout;

use crate::runtime::options::DEFAULT_POLL_INTERVAL;

/// Heredoc delimiter for the exec helper body.
const HELPER_EOF: &str = "UNDOCKIT_EXEC_EOF";

/// Builder for the script passed to `/bin/sh -c` when an instance starts.
#[derive(Debug, Clone)]
pub struct StartupScript {
    layout: SandboxLayout,
    idle_timeout: u64,
    poll_interval: u64,
}

impl StartupScript {
    /// Script for the given layout and idle budget (seconds).
    pub fn new(layout: SandboxLayout, idle_timeout: u64) -> Self {
        Self {
            layout,
            idle_timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Reaper polling cadence in seconds.
    pub fn poll_interval(mut self, seconds: u64) -> Self {
        self.poll_interval = seconds;
        self
    }

    /// Render the full startup script.
    pub fn render(&self) -> UndockitResult<String> {
        let pid_dir = quote_path(&self.layout.pid_dir())?;
        let bin_dir = quote_path(&self.layout.bin_dir())?;
        let helper = quote_path(&self.layout.exec_helper())?;

        Ok(format!(
            r#"#!/bin/sh
pid_dir={pid_dir}
mkdir -p "$pid_dir" {bin_dir}

cat > {helper} << '{eof}'
{helper_body}{eof}
chmod +x {helper}

timeout_seconds={timeout}
while true; do
    count=$(ls -A "$pid_dir" 2>/dev/null | wc -l)
    if [ "$count" -eq 0 ]; then
        mtime=$(stat -c %Y "$pid_dir" 2>/dev/null || echo 0)
        now=$(date +%s)
        if [ $((now - mtime)) -gt "$timeout_seconds" ]; then
            exit 0
        fi
    fi
    sleep {poll}
done
"#,
            eof = HELPER_EOF,
            helper_body = self.render_helper()?,
            timeout = self.idle_timeout,
            poll = self.poll_interval,
        ))
    }

    /// Render the exec helper on its own.
    ///
    /// Usage inside the sandbox: `<helper> <workdir> <command> [args...]`.
    /// The marker is removed on every exit path, including HUP, INT and TERM,
    /// which exit with 128 plus the signal number.
    pub fn render_helper(&self) -> UndockitResult<String> {
        let pid_dir = quote_path(&self.layout.pid_dir())?;

        Ok(format!(
            r#"#!/bin/sh
pid_dir={pid_dir}
pidfile="$pid_dir/$$"
workdir="$1"
shift
trap 'rm -f "$pidfile"; touch "$pid_dir"' EXIT
trap 'exit 129' HUP
trap 'exit 130' INT
trap 'exit 143' TERM
touch "$pidfile"
cd "$workdir" || exit 1
"$@"
exit $?
"#
        ))
    }
}

fn quote_path(path: &Path) -> UndockitResult<String> {
    let raw = path.to_string_lossy();
    shlex::try_quote(&raw)
        .map(|q| q.into_owned())
        .map_err(|e| UndockitError::Config(format!("cannot quote {}: {}", path.display(), e)))
}
