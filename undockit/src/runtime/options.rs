//! Runtime options.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use undockit_shared::layout::{HOST_MOUNT, SANDBOX_BASE};

use crate::backend::BackendKind;

/// Default idle budget in seconds.
pub const DEFAULT_IDLE_TIMEOUT: u64 = 600;

/// Default reaper polling cadence in seconds.
pub const DEFAULT_POLL_INTERVAL: u64 = 30;

/// Options shared by every invocation, loaded from the config file and
/// overridden by command-line flags.
///
/// Every field has a default, so a config file may set any subset:
///
/// ```json
/// { "engine": "podman", "default_timeout": 300, "gpu": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndockitOptions {
    /// Container engine implementation.
    pub engine: BackendKind,
    /// Engine executable. `None` uses the engine's own name from `PATH`.
    pub engine_path: Option<PathBuf>,
    /// Where the host root is bind-mounted inside the sandbox.
    pub host_mount: String,
    /// Base of the undockit runtime directory inside the sandbox.
    pub sandbox_base: PathBuf,
    /// Idle budget used when `run` is not given `--timeout`.
    pub default_timeout: u64,
    /// Reaper polling cadence in seconds.
    pub poll_interval: u64,
    /// Attach GPUs when the host exposes them.
    pub gpu: bool,
}

impl Default for UndockitOptions {
    fn default() -> Self {
        Self {
            engine: BackendKind::Podman,
            engine_path: None,
            host_mount: HOST_MOUNT.to_string(),
            sandbox_base: PathBuf::from(SANDBOX_BASE),
            default_timeout: DEFAULT_IDLE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            gpu: true,
        }
    }
}

impl UndockitOptions {
    /// Reject values the generated startup script cannot honour.
    pub fn validate(&self) -> undockit_shared::UndockitResult<()> {
        use undockit_shared::UndockitError;

        if self.poll_interval == 0 {
            return Err(UndockitError::Config(
                "poll_interval must be at least 1 second".to_string(),
            ));
        }
        if !self.host_mount.starts_with('/') {
            return Err(UndockitError::Config(format!(
                "host_mount must be an absolute path, got {:?}",
                self.host_mount
            )));
        }
        if !self.sandbox_base.is_absolute() {
            return Err(UndockitError::Config(format!(
                "sandbox_base must be an absolute path, got {}",
                self.sandbox_base.display()
            )));
        }
        Ok(())
    }
}
