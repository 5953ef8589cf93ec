//! Tool installation: build-spec templating and install-path resolution.
//!
//! An installed tool is a one-line Dockerfile whose shebang re-enters
//! undockit:
//!
//! ```text
//! #!/usr/bin/env -S undockit run --timeout=600
//! FROM deezer/spleeter
//! ```

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};
use undockit::runtime::options::DEFAULT_IDLE_TIMEOUT;
use undockit_shared::errors::{UndockitError, UndockitResult};

/// Shebang prefix identifying a file written by [`install`].
pub const SHEBANG_PREFIX: &str = "#!/usr/bin/env -S undockit run";

const TOOL_MODE: u32 = 0o755;

/// Where an installed tool goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallTarget {
    /// The user's bin directory.
    User,
    /// The active virtualenv or conda environment.
    Env,
}

impl FromStr for InstallTarget {
    type Err = UndockitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(InstallTarget::User),
            "env" => Ok(InstallTarget::Env),
            _ => Err(UndockitError::Install(format!(
                "Invalid target '{}': expected 'user' or 'env'",
                s
            ))),
        }
    }
}

/// Dockerfile content for a tool running `image`.
pub fn make_build_spec(image: &str, timeout: u64, no_gpu: bool) -> String {
    let mut shebang = format!("{} --timeout={}", SHEBANG_PREFIX, timeout);
    if no_gpu {
        shebang.push_str(" --no-gpu");
    }
    format!("{}\nFROM {}\n", shebang, image)
}

/// Tool name for an image reference: last path segment without tag or
/// digest.
pub fn extract_name(image: &str) -> String {
    let last = image.rsplit('/').next().unwrap_or(image);
    let last = last.split('@').next().unwrap_or(last);
    last.split(':').next().unwrap_or(last).to_string()
}

/// Resolve the directory a tool is installed into.
///
/// An explicit `prefix` wins and installs into `<prefix>/bin`. Otherwise
/// `user` uses `$PREFIX/bin`, then `$XDG_BIN_HOME`, then `~/.local/bin`;
/// `env` uses `$VIRTUAL_ENV/bin`, then `$CONDA_PREFIX/bin`.
pub fn resolve_target_dir<F>(to: &str, lookup: F, prefix: Option<&Path>) -> UndockitResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let target: InstallTarget = to.parse()?;

    if let Some(prefix) = prefix {
        return Ok(prefix.join("bin"));
    }

    let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

    match target {
        InstallTarget::User => {
            if let Some(prefix) = var("PREFIX") {
                Ok(PathBuf::from(prefix).join("bin"))
            } else if let Some(bin) = var("XDG_BIN_HOME") {
                Ok(PathBuf::from(bin))
            } else {
                dirs::home_dir()
                    .map(|home| home.join(".local").join("bin"))
                    .ok_or_else(|| {
                        UndockitError::Install("Cannot determine home directory".to_string())
                    })
            }
        }
        InstallTarget::Env => var("VIRTUAL_ENV")
            .or_else(|| var("CONDA_PREFIX"))
            .map(|env| PathBuf::from(env).join("bin"))
            .ok_or_else(|| {
                UndockitError::Install(
                    "No active environment: activate a virtualenv or conda environment, or use --to=user"
                        .to_string(),
                )
            }),
    }
}

/// Whether `path` holds a tool written by [`install`].
pub fn is_undockit_tool(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| content.starts_with(SHEBANG_PREFIX))
        .unwrap_or(false)
}

/// What to install and where.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub image: String,
    pub dir: PathBuf,
    pub name: Option<String>,
    pub timeout: u64,
    pub no_gpu: bool,
}

impl InstallRequest {
    pub fn new(image: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            dir: dir.into(),
            name: None,
            timeout: DEFAULT_IDLE_TIMEOUT,
            no_gpu: false,
        }
    }
}

/// Write the tool file and return its path.
///
/// An existing undockit tool of the same name is replaced; any other file
/// is left alone and reported as an error.
pub fn install(request: &InstallRequest) -> UndockitResult<PathBuf> {
    let name = request
        .name
        .clone()
        .unwrap_or_else(|| extract_name(&request.image));
    if name.is_empty() || name.contains('/') {
        return Err(UndockitError::Install(format!(
            "Invalid tool name '{}'",
            name
        )));
    }

    fs::create_dir_all(&request.dir).map_err(|e| {
        UndockitError::Install(format!("Cannot create {}: {}", request.dir.display(), e))
    })?;

    let path = request.dir.join(&name);
    if path.exists() && !is_undockit_tool(&path) {
        return Err(UndockitError::Install(format!(
            "Refusing to overwrite {}: not an undockit tool",
            path.display()
        )));
    }

    let content = make_build_spec(&request.image, request.timeout, request.no_gpu);
    debug!(path = %path.display(), "Writing tool");
    fs::write(&path, content)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(TOOL_MODE))?;

    info!(image = %request.image, path = %path.display(), "Installed tool");
    Ok(path)
}
