//! polyconf CLI
//!
//! Resolves layered configuration from the built-in sources and prints the
//! result in one of three views.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;
use polyconf_core::Status;

use cli::{Cli, Commands};
use error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    match execute_command(cli.command).await {
        Ok(Status::Failed) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Run `cmd`, returning the terminal status of its resolution.
async fn execute_command(cmd: Commands) -> Result<Status> {
    match cmd {
        Commands::Resolve { source, output } => commands::run_resolve(&source, output).await,
        Commands::List => commands::run_list().map(|()| Status::Success),
        Commands::Explain { path, source } => commands::run_explain(&path, &source).await,
    }
}
