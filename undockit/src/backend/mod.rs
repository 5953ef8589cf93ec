//! Container engine abstraction.
//!
//! [`Backend`] is the only seam through which undockit talks to a container
//! engine. Additional engines are added as new implementations registered in
//! [`create_backend`], never by branching on engine identity at call sites.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use undockit_shared::errors::{UndockitError, UndockitResult};

use crate::identity::InstanceName;
use crate::runtime::options::UndockitOptions;
use crate::runtime::types::{ExecRequest, ImageId, InstanceSpec};

pub mod gpu;
mod podman;

pub use podman::PodmanBackend;

/// Available container engine implementations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Podman,
}

impl BackendKind {
    /// Executable name looked up on `PATH` when no explicit path is given.
    pub fn program(&self) -> &'static str {
        match self {
            BackendKind::Podman => "podman",
        }
    }
}

impl FromStr for BackendKind {
    type Err = UndockitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "podman" => Ok(BackendKind::Podman),
            _ => Err(UndockitError::Config(format!(
                "Unknown engine: '{}'. Supported: podman",
                s
            ))),
        }
    }
}

/// Capability set a container engine must provide.
///
/// Mutations (`build`, `start`, `stop`) and inspection fail hard with the
/// engine's diagnostic. `is_running` is a query feeding a reuse decision and
/// never fails: any engine error reads as "not running", since a needless
/// restart is cheap and exec-ing into a dead instance is not.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Build an image from a build spec, with an empty build context.
    async fn build(&self, build_spec: &Path) -> UndockitResult<ImageId>;

    /// Default command of an image: entrypoint followed by cmd.
    async fn command(&self, image: &ImageId) -> UndockitResult<Vec<String>>;

    /// Start a detached instance running the idle reaper, replacing any
    /// instance already using the same name.
    async fn start(&self, spec: &InstanceSpec) -> UndockitResult<()>;

    /// Stop and remove an instance. Fails if it does not exist.
    async fn stop(&self, name: &InstanceName) -> UndockitResult<()>;

    /// Whether an instance with exactly this name is running.
    async fn is_running(&self, name: &InstanceName) -> bool;

    /// Run a command inside a running instance through the exec helper,
    /// attached to this process's stdio. Returns the command's exit code.
    async fn exec(&self, name: &InstanceName, request: &ExecRequest) -> UndockitResult<i32>;
}

/// Create the backend selected by `options`.
pub fn create_backend(options: &UndockitOptions) -> UndockitResult<Box<dyn Backend>> {
    options.validate()?;
    match options.engine {
        BackendKind::Podman => Ok(Box::new(PodmanBackend::from_options(options))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("podman".parse::<BackendKind>().unwrap(), BackendKind::Podman);
        assert_eq!("Podman".parse::<BackendKind>().unwrap(), BackendKind::Podman);
    }

    #[test]
    fn test_backend_kind_unknown() {
        let err = "lxc".parse::<BackendKind>().unwrap_err();
        assert!(err.to_string().contains("Unknown engine: 'lxc'"));
    }

    #[test]
    fn test_backend_kind_serde() {
        let kind: BackendKind = serde_json::from_str("\"podman\"").unwrap();
        assert_eq!(kind, BackendKind::Podman);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"podman\"");
    }

    #[test]
    fn test_create_backend_rejects_invalid_options() {
        let options = UndockitOptions {
            poll_interval: 0,
            ..Default::default()
        };
        assert!(create_backend(&options).is_err());
    }
}
