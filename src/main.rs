// src/main.rs

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::ConvertOverrides;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Convert {
            repos,
            repair_encoding,
            source_encoding,
            destination_encoding,
            on_failure,
            work_dir,
        } => commands::cmd_convert(
            repos,
            ConvertOverrides {
                repair_encoding,
                source_encoding,
                destination_encoding,
                on_failure,
                work_dir,
            },
        ),
        Commands::Pending { repos } => commands::cmd_pending(repos),
        Commands::Repair {
            directory,
            source_encoding,
            destination_encoding,
            dry_run,
        } => commands::cmd_repair(&directory, &source_encoding, &destination_encoding, dry_run),
    }
}
