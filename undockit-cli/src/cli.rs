//! CLI definition and argument parsing for undockit.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::shells::{Bash, Fish, Zsh};
use std::io::Write;
use std::path::PathBuf;

use undockit::{BackendKind, Controller, UndockitOptions, create_backend};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "undockit",
    author,
    version,
    about = "Run container images as warm, self-reaping CLI commands"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
#[non_exhaustive]
pub enum Commands {
    /// Build a tool's image and run its command in a warm instance
    Run(crate::commands::run::RunArgs),

    /// Stop and remove a tool's warm instance
    Stop(crate::commands::stop::StopArgs),

    /// Install an image as an executable tool
    Install(crate::commands::install::InstallArgs),

    /// Generate shell completion script (hidden from help)
    #[command(hide = true)]
    Completion(CompletionArgs),
}

/// Shell for which to generate completion script.
#[derive(ValueEnum, Clone, Debug)]
#[value(rename_all = "lower")]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completion for (bash, zsh, fish).
    pub shell: Shell,
}

/// Writes a completion script for the given shell to `out`.
pub fn generate_completion(shell: &Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    match shell {
        Shell::Bash => clap_complete::generate(Bash, &mut cmd, name, out),
        Shell::Zsh => clap_complete::generate(Zsh, &mut cmd, name, out),
        Shell::Fish => clap_complete::generate(Fish, &mut cmd, name, out),
    }
}

pub fn print_completion(shell: &Shell) {
    generate_completion(shell, &mut std::io::stdout());
}

// ============================================================================
// GLOBAL FLAGS
// ============================================================================

#[derive(Args, Debug, Clone)]
pub struct GlobalFlags {
    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file path (optional)
    ///
    /// JSON file with undockit options such as default_timeout or gpu.
    /// Any subset of fields may be given; the rest keep their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Container engine to use
    #[arg(long, global = true, env = "UNDOCKIT_ENGINE")]
    pub engine: Option<BackendKind>,

    /// Path to the container engine executable
    #[arg(long, global = true, env = "UNDOCKIT_ENGINE_PATH")]
    pub engine_path: Option<PathBuf>,
}

impl GlobalFlags {
    /// Options from the config file (or defaults), with flags and
    /// environment applied on top.
    pub fn load_options(&self) -> anyhow::Result<UndockitOptions> {
        let mut options = if let Some(config_path) = &self.config {
            crate::config::load_config(config_path)?
        } else {
            UndockitOptions::default()
        };

        if let Some(engine) = self.engine {
            options.engine = engine;
        }
        if let Some(engine_path) = &self.engine_path {
            options.engine_path = Some(engine_path.clone());
        }

        options.validate()?;
        Ok(options)
    }

    pub fn create_controller(&self, options: UndockitOptions) -> anyhow::Result<Controller> {
        let backend = create_backend(&options)?;
        Ok(Controller::new(backend, options))
    }
}
