//! Podman backend.
//!
//! Runs rootless: `--userns=keep-id` maps the invoking user into the
//! sandbox with the same uid, so files written under the host mount keep
//! their owner. `--replace` makes a start supersede any stale instance of
//! the same name atomically at the engine level.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use undockit_shared::errors::{UndockitError, UndockitResult};
use undockit_shared::layout::SandboxLayout;

use super::{Backend, gpu};
use crate::identity::InstanceName;
use crate::runtime::options::UndockitOptions;
use crate::runtime::types::{ExecRequest, ImageId, InstanceSpec};
use crate::sandbox::StartupScript;
use crate::util::process;

const ENTRYPOINT_FORMAT: &str = "{{json .Config.Entrypoint}}";
const CMD_FORMAT: &str = "{{json .Config.Cmd}}";

/// [`Backend`] driving the `podman` CLI.
#[derive(Debug, Clone)]
pub struct PodmanBackend {
    program: PathBuf,
    host_mount: String,
    layout: SandboxLayout,
    poll_interval: u64,
    cdi_specs: Vec<PathBuf>,
}

impl PodmanBackend {
    pub fn from_options(options: &UndockitOptions) -> Self {
        Self {
            program: options
                .engine_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(options.engine.program())),
            host_mount: options.host_mount.clone(),
            layout: SandboxLayout::new(&options.sandbox_base),
            poll_interval: options.poll_interval,
            cdi_specs: gpu::default_cdi_specs(),
        }
    }

    /// Override where CDI specs are looked up.
    pub fn with_cdi_specs(mut self, cdi_specs: Vec<PathBuf>) -> Self {
        self.cdi_specs = cdi_specs;
        self
    }

    fn engine(&self) -> Command {
        Command::new(&self.program)
    }

    /// `podman build -f <spec> <context>`
    fn build_args(build_spec: &Path, context: &Path) -> Vec<String> {
        vec![
            "build".to_string(),
            "-f".to_string(),
            build_spec.to_string_lossy().into_owned(),
            context.to_string_lossy().into_owned(),
        ]
    }

    /// `podman run -d --replace ... <image> -c <startup script>`
    fn start_args(&self, spec: &InstanceSpec, script: &str) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--replace".to_string(),
            "--name".to_string(),
            spec.name.to_string(),
            "--userns=keep-id".to_string(),
            "--mount".to_string(),
            format!("type=bind,source=/,target={}", self.host_mount),
            "--entrypoint".to_string(),
            "/bin/sh".to_string(),
        ];
        if spec.gpu {
            args.extend(gpu::gpu_flags(&self.cdi_specs));
        }
        args.extend([
            spec.image.to_string(),
            "-c".to_string(),
            script.to_string(),
        ]);
        args
    }

    /// `podman exec -i [-t] <name> <helper> <workdir> <argv...>`
    fn exec_args(&self, name: &InstanceName, request: &ExecRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["exec".into(), "-i".into()];
        if request.tty {
            args.push("-t".into());
        }
        args.push(name.as_str().into());
        args.push(self.layout.exec_helper().into_os_string());
        args.push(request.workdir.clone().into());
        args.extend(request.argv.iter().cloned());
        args
    }

    fn ps_args(name: &InstanceName) -> Vec<String> {
        vec![
            "ps".to_string(),
            "--filter".to_string(),
            format!("name={}", name),
            "--format".to_string(),
            "{{.Names}}".to_string(),
        ]
    }

    async fn inspect(&self, image: &ImageId, format: &str) -> UndockitResult<Option<Vec<String>>> {
        let output = process::output(self.engine().args([
            "inspect",
            image.as_str(),
            "--format",
            format,
        ]))
        .await
        .map_err(|e| UndockitError::Inspection(e.to_string()))?;

        if !output.status.success() {
            return Err(UndockitError::Inspection(format!(
                "inspect {} failed: {}",
                image,
                process::stderr_text(&output)
            )));
        }

        parse_json_argv(&String::from_utf8_lossy(&output.stdout))
    }

    async fn run_checked(&self, args: &[String], what: &str) -> UndockitResult<()> {
        let output = process::output(self.engine().args(args)).await?;
        if !output.status.success() {
            return Err(UndockitError::Engine(format!(
                "{} failed: {}",
                what,
                process::stderr_text(&output)
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for PodmanBackend {
    async fn build(&self, build_spec: &Path) -> UndockitResult<ImageId> {
        if !build_spec.exists() {
            return Err(UndockitError::Build(format!(
                "Dockerfile not found: {}",
                build_spec.display()
            )));
        }

        // Empty context: the spec's own directory must not leak into the build.
        let context = tempfile::tempdir()?;
        let args = Self::build_args(build_spec, context.path());

        info!(spec = %build_spec.display(), "Building image");
        let output = process::output(self.engine().args(&args))
            .await
            .map_err(|e| UndockitError::Build(e.to_string()))?;

        if !output.status.success() {
            return Err(UndockitError::Build(process::stderr_text(&output)));
        }

        let image = parse_build_output(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| UndockitError::Build("No output from build command".to_string()))?;
        debug!(image = %image, "Build finished");
        Ok(image)
    }

    async fn command(&self, image: &ImageId) -> UndockitResult<Vec<String>> {
        let entrypoint = self.inspect(image, ENTRYPOINT_FORMAT).await?;
        let cmd = self.inspect(image, CMD_FORMAT).await?;
        Ok(compose_command(entrypoint, cmd))
    }

    async fn start(&self, spec: &InstanceSpec) -> UndockitResult<()> {
        let script = StartupScript::new(self.layout.clone(), spec.idle_timeout)
            .poll_interval(self.poll_interval)
            .render()?;
        let args = self.start_args(spec, &script);

        info!(
            instance = %spec.name,
            image = %spec.image,
            idle_timeout = spec.idle_timeout,
            "Starting instance"
        );
        self.run_checked(&args, &format!("start {}", spec.name))
            .await
    }

    async fn stop(&self, name: &InstanceName) -> UndockitResult<()> {
        info!(instance = %name, "Stopping instance");
        self.run_checked(&["stop".to_string(), name.to_string()], &format!("stop {}", name))
            .await?;
        self.run_checked(&["rm".to_string(), name.to_string()], &format!("rm {}", name))
            .await
    }

    async fn is_running(&self, name: &InstanceName) -> bool {
        let output = match process::output(self.engine().args(Self::ps_args(name))).await {
            Ok(output) => output,
            Err(e) => {
                debug!(instance = %name, "Liveness query failed, assuming not running: {}", e);
                return false;
            }
        };

        if !output.status.success() {
            debug!(
                instance = %name,
                "Liveness query failed, assuming not running: {}",
                process::stderr_text(&output)
            );
            return false;
        }

        names_contain(&String::from_utf8_lossy(&output.stdout), name)
    }

    async fn exec(&self, name: &InstanceName, request: &ExecRequest) -> UndockitResult<i32> {
        let mut cmd = self.engine();
        cmd.args(self.exec_args(name, request));
        process::run_attached(cmd).await
    }
}

/// Image ID from build output: the last non-empty line.
fn parse_build_output(stdout: &str) -> Option<ImageId> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(ImageId::new)
}

/// Parse one `{{json ...}}` inspect field. `null` means unset.
fn parse_json_argv(raw: &str) -> UndockitResult<Option<Vec<String>>> {
    serde_json::from_str(raw.trim())
        .map_err(|e| UndockitError::Inspection(format!("malformed metadata {:?}: {}", raw.trim(), e)))
}

/// Default command composition: entrypoint first, then cmd.
fn compose_command(entrypoint: Option<Vec<String>>, cmd: Option<Vec<String>>) -> Vec<String> {
    entrypoint
        .unwrap_or_default()
        .into_iter()
        .chain(cmd.unwrap_or_default())
        .collect()
}

/// `ps --filter name=` matches substrings, so compare whole lines.
fn names_contain(stdout: &str, name: &InstanceName) -> bool {
    stdout.lines().any(|line| line.trim() == name.as_str())
}
