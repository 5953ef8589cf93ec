//! Core data types for instance lifecycle management.

use std::ffi::OsString;
use std::fmt;

use crate::identity::InstanceName;

// ============================================================================
// IMAGE ID
// ============================================================================

/// Engine-assigned image identifier, as printed by the last line of a build.
///
/// Opaque to undockit: it is only shortened for naming and passed back to
/// the engine verbatim.
///
/// # Example
///
/// ```
/// use undockit::ImageId;
///
/// let id = ImageId::new("abc123def4567890fedcba");
/// assert_eq!(id.short(), "abc123def456");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ImageId(String);

impl ImageId {
    /// Length of the short image ID used in instance names (12 hex chars).
    pub const SHORT_LENGTH: usize = 12;

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the full image ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the short form: first 12 characters, ignoring a `sha256:` prefix.
    ///
    /// IDs shorter than 12 characters are returned whole.
    pub fn short(&self) -> &str {
        let clean = self.0.strip_prefix("sha256:").unwrap_or(&self.0);
        match clean.char_indices().nth(Self::SHORT_LENGTH) {
            Some((idx, _)) => &clean[..idx],
            None => clean,
        }
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageId({})", self.short())
    }
}

impl AsRef<str> for ImageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// INSTANCE
// ============================================================================

/// Everything the backend needs to start a warm instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSpec {
    /// Deterministic instance name (see [`crate::identity`]).
    pub name: InstanceName,
    /// Image the instance runs.
    pub image: ImageId,
    /// Idle budget in seconds before the in-sandbox reaper exits.
    pub idle_timeout: u64,
    /// Attach accelerator devices when the host has them.
    pub gpu: bool,
}

/// Host-observable lifecycle states of an instance.
///
/// `Running` covers both idle and busy; that distinction only exists inside
/// the sandbox (marker files) and is never tracked by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceState {
    /// No instance under this name.
    Absent,
    /// Build and start in progress.
    Starting,
    /// The engine reports the instance as running.
    Running,
    /// Stopped explicitly, or the reaper exited.
    Stopped,
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Absent => "absent",
            InstanceState::Starting => "starting",
            InstanceState::Running => "running",
            InstanceState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

// ============================================================================
// EXECUTION
// ============================================================================

/// One invocation to run inside a running instance.
///
/// Stdio is always the invoking process's own (inherited), so it is not
/// part of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRequest {
    /// Full command line: image entrypoint ++ cmd ++ user arguments.
    ///
    /// User arguments are passed on byte for byte, so they need not be
    /// UTF-8.
    pub argv: Vec<OsString>,
    /// Working directory inside the sandbox (host cwd under the host mount).
    pub workdir: String,
    /// Request a TTY (host stdin is a terminal).
    pub tty: bool,
}
