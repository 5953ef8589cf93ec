//! Lifecycle controller.
//!
//! Per invocation: build the image (the engine's layer cache makes a rebuild
//! of an unchanged spec cheap), name the instance, start it unless one is
//! already running under that name, then exec through the [`Gateway`].
//!
//! The host never tracks idle/busy. That distinction lives inside the
//! sandbox, and a reaped instance is only noticed lazily by the next
//! `is_running` query.

use std::ffi::OsString;
use std::path::Path;

use tracing::{debug, info};

use undockit_shared::errors::{UndockitError, UndockitResult};

use crate::backend::Backend;
use crate::gateway::Gateway;
use crate::identity::{InstanceName, current_uid, instance_name};
use crate::runtime::options::UndockitOptions;
use crate::runtime::types::{ImageId, InstanceSpec, InstanceState};

/// Per-invocation knobs of `run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Idle budget (seconds) for a newly started instance.
    pub timeout: u64,
    /// Attach GPUs when the host has them.
    pub gpu: bool,
}

impl RunOptions {
    pub fn from_options(options: &UndockitOptions) -> Self {
        Self {
            timeout: options.default_timeout,
            gpu: options.gpu,
        }
    }
}

/// A built image resolved to its instance name and default command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub image: ImageId,
    pub name: InstanceName,
    pub command: Vec<String>,
}

/// What [`Controller::ensure_running`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// An instance was already running under the name.
    Reused,
    /// A new instance was started.
    Started,
}

pub struct Controller {
    backend: Box<dyn Backend>,
    options: UndockitOptions,
    uid: u32,
}

impl Controller {
    pub fn new(backend: Box<dyn Backend>, options: UndockitOptions) -> Self {
        Self {
            backend,
            options,
            uid: current_uid(),
        }
    }

    /// Name instances for `uid` instead of the invoking user.
    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = uid;
        self
    }

    /// Build `build_spec` and resolve instance name and default command.
    pub async fn prepare(&self, build_spec: &Path) -> UndockitResult<Prepared> {
        let image = self.backend.build(build_spec).await?;
        let command = self.backend.command(&image).await?;
        let name = instance_name(self.uid, &image);
        debug!(instance = %name, image = %image, command = ?command, "Prepared");

        Ok(Prepared {
            image,
            name,
            command,
        })
    }

    /// Start the instance for `prepared` unless it is already running.
    pub async fn ensure_running(
        &self,
        prepared: &Prepared,
        run: &RunOptions,
    ) -> UndockitResult<Launch> {
        if self.backend.is_running(&prepared.name).await {
            debug!(instance = %prepared.name, state = %InstanceState::Running, "Reusing instance");
            return Ok(Launch::Reused);
        }

        info!(
            instance = %prepared.name,
            from = %InstanceState::Absent,
            to = %InstanceState::Starting,
            "Instance not running"
        );
        let spec = InstanceSpec {
            name: prepared.name.clone(),
            image: prepared.image.clone(),
            idle_timeout: run.timeout,
            gpu: run.gpu,
        };
        self.backend.start(&spec).await?;
        info!(instance = %prepared.name, state = %InstanceState::Running, "Instance started");

        Ok(Launch::Started)
    }

    /// Run the image's default command followed by `user_args` in a warm
    /// instance and return its exit code.
    pub async fn run(
        &self,
        build_spec: &Path,
        user_args: &[OsString],
        run: &RunOptions,
    ) -> UndockitResult<i32> {
        let prepared = self.prepare(build_spec).await?;

        let argv: Vec<OsString> = prepared
            .command
            .iter()
            .map(OsString::from)
            .chain(user_args.iter().cloned())
            .collect();
        if argv.is_empty() {
            return Err(UndockitError::Inspection(format!(
                "image {} has no entrypoint or cmd and no arguments were given",
                prepared.image
            )));
        }

        self.ensure_running(&prepared, run).await?;

        Gateway::new(self.backend.as_ref(), &self.options.host_mount)
            .execute(&prepared.name, argv)
            .await
    }

    /// Stop and remove the instance for `build_spec`.
    pub async fn stop(&self, build_spec: &Path) -> UndockitResult<InstanceName> {
        let prepared = self.prepare(build_spec).await?;
        self.backend.stop(&prepared.name).await?;
        info!(instance = %prepared.name, state = %InstanceState::Stopped, "Instance stopped");
        Ok(prepared.name)
    }
}

// ============================================================================
// THREAD SAFETY ASSERTIONS
// ============================================================================

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Controller>;
};
