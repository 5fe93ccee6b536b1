//! piisync: keeps the local PII pattern table in step with the published
//! pattern file.
//!
//! # Usage
//!
//! ```text
//! piisync [run] [--full-diff]
//! piisync config [--full-diff]
//! piisync once [--full-diff]      (dev-tools builds only)
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[cfg(feature = "dev-tools")]
use commands::once::OnceArgs;
use commands::{config::ConfigArgs, run::RunArgs};

#[derive(Parser, Debug)]
#[command(
    name = "piisync",
    version,
    about = "Sync PII detection patterns from GitHub into a local SQLite table",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the scheduler and sync every minute until Ctrl-C (default).
    Run(RunArgs),

    /// Print the compiled-in configuration as YAML.
    Config(ConfigArgs),

    /// Run a single sync cycle and print what changed.
    #[cfg(feature = "dev-tools")]
    Once(OnceArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => args.run(),
        Commands::Config(args) => args.run(),
        #[cfg(feature = "dev-tools")]
        Commands::Once(args) => args.run(),
    }
}
