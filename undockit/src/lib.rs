//! undockit - run container images as warm, self-reaping CLI commands.
//!
//! The first invocation of a tool builds its image and starts a detached
//! sandbox; later invocations exec into the same sandbox. An idle reaper
//! running inside the sandbox shuts it down once no execution has been active
//! for the configured budget, so no host daemon is needed.
//!
//! # Layout
//!
//! - [`backend`]: container engine capability trait and the Podman backend
//! - [`identity`]: deterministic instance naming per (uid, image)
//! - [`sandbox`]: startup script with the exec helper and idle reaper
//! - [`gateway`]: maps a host invocation onto an exec into the sandbox
//! - [`lifecycle`]: decides whether to start or reuse, then execs
//! - [`runtime`]: options and core data types

pub mod backend;
pub mod gateway;
pub mod identity;
pub mod lifecycle;
pub mod runtime;
pub mod sandbox;

mod util;

pub use backend::{Backend, BackendKind, PodmanBackend, create_backend};
pub use gateway::Gateway;
pub use identity::{InstanceName, instance_name};
pub use lifecycle::{Controller, Launch, Prepared, RunOptions};
pub use runtime::options::UndockitOptions;
pub use runtime::types::{ExecRequest, ImageId, InstanceSpec, InstanceState};
pub use undockit_shared::errors::{UndockitError, UndockitResult};
pub use undockit_shared::layout::SandboxLayout;
