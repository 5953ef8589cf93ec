use crate::cli::GlobalFlags;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct StopArgs {
    /// Build spec of the tool whose instance to stop
    pub spec: PathBuf,
}

/// Entry point
pub async fn execute(args: StopArgs, global: &GlobalFlags) -> anyhow::Result<i32> {
    let options = global.load_options()?;
    let controller = global.create_controller(options)?;

    let name = controller.stop(&args.spec).await?;
    println!("{}", name);
    Ok(0)
}
