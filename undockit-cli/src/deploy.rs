//! Launcher deployment.
//!
//! Installed tools re-enter `undockit` through their shebang, so an
//! `undockit` binary is placed next to them whenever the copy there is
//! missing or reports a different version.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};
use undockit_shared::errors::{UndockitError, UndockitResult};

/// File name of the deployed launcher.
pub const LAUNCHER_NAME: &str = "undockit";

/// `--version` line printed by a launcher of `version`.
pub fn version_line(version: &str) -> String {
    format!("{} {}", LAUNCHER_NAME, version)
}

/// Whether the launcher at `path` must be (re)deployed.
///
/// True when it is missing, fails to report a version, or reports a
/// different one.
pub fn needs_update(path: &Path, version: &str) -> bool {
    if !path.exists() {
        return true;
    }

    let output = match Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
    {
        Ok(output) => output,
        Err(e) => {
            debug!(path = %path.display(), "Launcher not runnable: {}", e);
            return true;
        }
    };
    if !output.status.success() {
        return true;
    }

    let reported = String::from_utf8_lossy(&output.stdout);
    reported.trim() != version_line(version)
}

/// Copy the running executable to `<dir>/undockit` if needed.
///
/// Returns the deployed path, or `None` when an up-to-date launcher was
/// already there.
pub fn deploy_launcher(dir: &Path, version: &str) -> UndockitResult<Option<PathBuf>> {
    let source = std::env::current_exe()?;
    deploy_from(&source, dir, version)
}

fn deploy_from(source: &Path, dir: &Path, version: &str) -> UndockitResult<Option<PathBuf>> {
    let target = dir.join(LAUNCHER_NAME);
    if !needs_update(&target, version) {
        debug!(path = %target.display(), "Launcher up to date");
        return Ok(None);
    }

    fs::create_dir_all(dir)?;

    // Copy beside the target and rename over it: the old launcher may be
    // running right now and cannot be truncated in place.
    let staging = dir.join(format!(".{}.tmp", LAUNCHER_NAME));
    fs::copy(source, &staging).map_err(|e| {
        UndockitError::Install(format!(
            "Cannot copy launcher {} to {}: {}",
            source.display(),
            staging.display(),
            e
        ))
    })?;
    fs::set_permissions(&staging, fs::Permissions::from_mode(0o755))?;
    fs::rename(&staging, &target)?;

    info!(path = %target.display(), version, "Deployed launcher");
    Ok(Some(target))
}
