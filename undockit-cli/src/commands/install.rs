use clap::Args;
use std::path::PathBuf;

use crate::deploy;
use crate::install::{self, InstallRequest};
use undockit::runtime::options::DEFAULT_IDLE_TIMEOUT;

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Image to install, e.g. deezer/spleeter:latest
    pub image: String,

    /// Install target: `user` or `env` (active virtualenv/conda)
    #[arg(long, default_value = "user")]
    pub to: String,

    /// Tool name (defaults to the image name without registry or tag)
    #[arg(long)]
    pub name: Option<String>,

    /// Install into <PREFIX>/bin, overriding --to
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Idle seconds before the tool's warm instance shuts itself down
    #[arg(long, default_value_t = DEFAULT_IDLE_TIMEOUT)]
    pub timeout: u64,

    /// Never attach GPUs when running the tool
    #[arg(long)]
    pub no_gpu: bool,

    /// Do not deploy the undockit launcher next to the tool
    #[arg(long)]
    pub no_undockit: bool,
}

/// Entry point
pub fn execute(args: InstallArgs) -> anyhow::Result<i32> {
    let dir = install::resolve_target_dir(
        &args.to,
        |k| std::env::var(k).ok(),
        args.prefix.as_deref(),
    )?;

    let request = InstallRequest {
        name: args.name,
        timeout: args.timeout,
        no_gpu: args.no_gpu,
        ..InstallRequest::new(args.image.clone(), dir.clone())
    };
    let path = install::install(&request)?;

    if !args.no_undockit
        && let Some(launcher) = deploy::deploy_launcher(&dir, env!("CARGO_PKG_VERSION"))?
    {
        tracing::info!(path = %launcher.display(), "Launcher deployed");
    }

    println!("Installed {} as {}", args.image, path.display());
    Ok(0)
}
