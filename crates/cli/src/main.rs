mod commands;
mod harness;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::TestCommand;

/// Rota CLI - Shift plan scenario testing tool
#[derive(Debug, Parser)]
#[command(name = "rota", version, about = "Shift plan scenario testing tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute plan scenarios
    Test(TestCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Test(cmd) => cmd.execute()?,
    };

    std::process::exit(exit_code);
}
