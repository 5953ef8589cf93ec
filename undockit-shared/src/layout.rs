//! Filesystem layout inside a running sandbox.
//!
//! The startup script creates this tree before anything else runs, and every
//! exec goes through the helper it deploys:
//!
//! ```text
//! /tmp/undockit/
//! ├── pid/     # one marker file per active execution (named by helper pid)
//! ├── bin/     # helper binaries
//! └── exec     # exec helper script
//! ```
//!
//! The modification time of `pid/` is the idle clock read by the reaper.

use std::path::{Path, PathBuf};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Directory and file names under the sandbox base.
pub mod dirs {
    /// Active-executions directory (marker files)
    pub const PID: &str = "pid";

    /// Helper binaries directory
    pub const BIN: &str = "bin";

    /// Exec helper script name
    pub const EXEC_HELPER: &str = "exec";
}

/// Sandbox base path.
pub const SANDBOX_BASE: &str = "/tmp/undockit";

/// Mount point of the host root filesystem inside the sandbox.
pub const HOST_MOUNT: &str = "/host";

// ============================================================================
// SANDBOX LAYOUT
// ============================================================================

/// Layout of the undockit runtime directory inside a sandbox.
///
/// The base is configurable so the generated scripts can be exercised
/// outside a container (tests point it at a temp directory).
///
/// # Example
///
/// ```
/// use undockit_shared::layout::SandboxLayout;
///
/// let layout = SandboxLayout::default();
/// assert_eq!(layout.pid_dir().to_str().unwrap(), "/tmp/undockit/pid");
/// assert_eq!(layout.exec_helper().to_str().unwrap(), "/tmp/undockit/exec");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SandboxLayout {
    base: PathBuf,
}

impl SandboxLayout {
    /// Create a layout rooted at the given base path.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Base directory: /tmp/undockit
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Active-executions directory: {base}/pid
    pub fn pid_dir(&self) -> PathBuf {
        self.base.join(dirs::PID)
    }

    /// Helper binaries directory: {base}/bin
    pub fn bin_dir(&self) -> PathBuf {
        self.base.join(dirs::BIN)
    }

    /// Exec helper script: {base}/exec
    pub fn exec_helper(&self) -> PathBuf {
        self.base.join(dirs::EXEC_HELPER)
    }
}

impl Default for SandboxLayout {
    fn default() -> Self {
        Self::new(SANDBOX_BASE)
    }
}
