//! Error taxonomy for undockit.
//!
//! Build, inspection and engine errors are fatal and carry the engine's own
//! diagnostic text. Liveness-query failures never surface as errors (they are
//! folded into "not running"), and a user command exiting nonzero is an exit
//! code, not an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UndockitError {
    /// Build spec missing, or the engine build failed.
    #[error("Build failed: {0}")]
    Build(String),

    /// Image metadata (entrypoint / cmd) could not be queried or parsed.
    #[error("Image inspection failed: {0}")]
    Inspection(String),

    /// The container engine rejected a mutation or could not be spawned.
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Install failed: {0}")]
    Install(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type UndockitResult<T> = std::result::Result<T, UndockitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_carries_diagnostic() {
        let err = UndockitError::Build("Error: no FROM line".to_string());
        assert_eq!(err.to_string(), "Build failed: Error: no FROM line");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "podman");
        let err: UndockitError = io.into();
        assert!(matches!(err, UndockitError::Io(_)));
        assert!(err.to_string().contains("podman"));
    }
}
