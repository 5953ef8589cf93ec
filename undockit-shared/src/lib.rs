//! Definitions shared between the undockit library and CLI.
//!
//! - [`errors`]: the error taxonomy used across the workspace
//! - [`layout`]: the filesystem layout inside a running sandbox

pub mod errors;
pub mod layout;

pub use errors::{UndockitError, UndockitResult};
pub use layout::SandboxLayout;
