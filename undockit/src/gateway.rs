//! Execution gateway: host invocation -> exec into a running instance.

use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::Path;

use tracing::debug;

use undockit_shared::errors::UndockitResult;

use crate::backend::Backend;
use crate::identity::InstanceName;
use crate::runtime::types::ExecRequest;

/// Maps the invoking process's cwd and terminal onto an [`ExecRequest`]
/// and hands it to the backend.
pub struct Gateway<'a> {
    backend: &'a dyn Backend,
    host_mount: &'a str,
}

impl<'a> Gateway<'a> {
    pub fn new(backend: &'a dyn Backend, host_mount: &'a str) -> Self {
        Self {
            backend,
            host_mount,
        }
    }

    /// Location of a host directory inside the sandbox.
    ///
    /// Plain string join under the host mount. The path is not
    /// canonicalized and symlinks are not resolved, so `/a/b` maps to
    /// `/host/a/b` even when `/a` is a link.
    pub fn map_workdir(&self, cwd: &Path) -> String {
        format!(
            "{}{}",
            self.host_mount.trim_end_matches('/'),
            cwd.to_string_lossy()
        )
    }

    pub fn request(&self, argv: Vec<OsString>, cwd: &Path, tty: bool) -> ExecRequest {
        ExecRequest {
            argv,
            workdir: self.map_workdir(cwd),
            tty,
        }
    }

    /// Run `argv` in `name` from the current directory and return its exit
    /// code unchanged.
    pub async fn execute(&self, name: &InstanceName, argv: Vec<OsString>) -> UndockitResult<i32> {
        let cwd = std::env::current_dir()?;
        let tty = std::io::stdin().is_terminal();
        let request = self.request(argv, &cwd, tty);

        debug!(
            instance = %name,
            workdir = %request.workdir,
            tty = request.tty,
            "Executing in instance"
        );
        let code = self.backend.exec(name, &request).await?;
        debug!(instance = %name, exit_code = code, "Execution finished");
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::options::UndockitOptions;
    use crate::PodmanBackend;

    fn backend() -> PodmanBackend {
        PodmanBackend::from_options(&UndockitOptions::default())
    }

    #[test]
    fn test_map_workdir_prefix_join() {
        let backend = backend();
        let gateway = Gateway::new(&backend, "/host");
        assert_eq!(gateway.map_workdir(Path::new("/a/b")), "/host/a/b");
        assert_eq!(gateway.map_workdir(Path::new("/")), "/host/");
        assert_eq!(
            gateway.map_workdir(Path::new("/home/user/my project")),
            "/host/home/user/my project"
        );
    }

    #[test]
    fn test_map_workdir_does_not_normalize() {
        let backend = backend();
        let gateway = Gateway::new(&backend, "/host");
        assert_eq!(gateway.map_workdir(Path::new("/a/../b")), "/host/a/../b");
    }

    #[test]
    fn test_map_workdir_trailing_slash_mount() {
        let backend = backend();
        let gateway = Gateway::new(&backend, "/mnt/root/");
        assert_eq!(gateway.map_workdir(Path::new("/srv")), "/mnt/root/srv");
    }

    #[test]
    fn test_request() {
        let backend = backend();
        let gateway = Gateway::new(&backend, "/host");
        let request = gateway.request(
            vec!["tool".into(), "x".into()],
            Path::new("/work"),
            true,
        );
        assert_eq!(request.argv, vec!["tool", "x"]);
        assert_eq!(request.workdir, "/host/work");
        assert!(request.tty);
    }
}
