mod args;
mod cli;
mod commands;
mod config;
mod deploy;
mod install;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let argv = args::get_args(std::env::args_os().collect());
    let cli = Cli::parse_from(argv);

    if cli.global.debug {
        // SAFETY: single-threaded runtime, nothing else reads the environment yet
        unsafe {
            std::env::set_var("RUST_LOG", "debug");
        }
    }
    init_logging();

    let code = match dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

/// Diagnostics go to stderr only; stdout belongs to the tool being run.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, &cli.global).await,
        Commands::Stop(args) => commands::stop::execute(args, &cli.global).await,
        Commands::Install(args) => commands::install::execute(args),
        Commands::Completion(args) => {
            cli::print_completion(&args.shell);
            Ok(0)
        }
    }
}
