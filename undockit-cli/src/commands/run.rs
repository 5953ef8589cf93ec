use crate::cli::GlobalFlags;
use clap::Args;
use std::ffi::OsString;
use std::path::Path;
use undockit::{RunOptions, UndockitOptions};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Idle seconds before the warm instance shuts itself down
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Do not attach GPUs even when the host has them
    #[arg(long)]
    pub no_gpu: bool,

    /// Build spec of the tool, followed by arguments for its command
    ///
    /// Everything after the build spec is passed to the tool untouched,
    /// including arguments that look like undockit flags.
    #[arg(
        value_name = "SPEC",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl RunArgs {
    fn run_options(&self, options: &UndockitOptions) -> RunOptions {
        let defaults = RunOptions::from_options(options);
        RunOptions {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            gpu: defaults.gpu && !self.no_gpu,
        }
    }

    fn split(&self) -> anyhow::Result<(&Path, &[OsString])> {
        match self.command.split_first() {
            Some((spec, user_args)) => Ok((Path::new(spec), user_args)),
            None => anyhow::bail!("missing build spec"),
        }
    }
}

/// Entry point
pub async fn execute(args: RunArgs, global: &GlobalFlags) -> anyhow::Result<i32> {
    let options = global.load_options()?;
    let run = args.run_options(&options);
    let (spec, user_args) = args.split()?;

    let controller = global.create_controller(options)?;
    let code = controller.run(spec, user_args, &run).await?;
    Ok(code)
}
