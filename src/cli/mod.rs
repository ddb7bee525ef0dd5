// src/cli/mod.rs
//! CLI definitions for rdiff2restic
//!
//! This module contains the command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `convert` - Migrate every missing increment into the restic repository
//! - `pending` - List increments that still need to be migrated
//! - `repair` - Normalize filename encodings of a directory tree in place

use clap::{Args, Parser, Subcommand};
use rdiff2restic::FailurePolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rdiff2restic")]
#[command(author = "rdiff2restic Contributors")]
#[command(version)]
#[command(about = "Migrate rdiff-backup history into a restic repository", long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Repositories and credentials shared by conversion commands
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// rdiff-backup repository (legacy history)
    pub legacy_repo: PathBuf,

    /// restic repository receiving the snapshots
    pub restic_repo: PathBuf,

    /// restic password file
    #[arg(short, long)]
    pub password_file: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every increment not yet present in the restic repository
    Convert {
        #[command(flatten)]
        repos: RepoArgs,

        /// Repair legacy filename encodings before each snapshot
        #[arg(long)]
        repair_encoding: bool,

        /// Encoding of legacy filenames (default: iso-8859-1)
        #[arg(long)]
        source_encoding: Option<String>,

        /// Encoding filenames are converted to (default: utf-8)
        #[arg(long)]
        destination_encoding: Option<String>,

        /// Behaviour after a failed increment
        #[arg(long, value_enum)]
        on_failure: Option<FailurePolicy>,

        /// Parent directory for restored increments
        #[arg(long)]
        work_dir: Option<PathBuf>,
    },

    /// List increments that still need to be converted
    Pending {
        #[command(flatten)]
        repos: RepoArgs,
    },

    /// Repair filename encodings of a directory tree in place
    Repair {
        /// Root of the tree to repair
        directory: PathBuf,

        /// Encoding of legacy filenames
        #[arg(long, default_value = "iso-8859-1")]
        source_encoding: String,

        /// Encoding filenames are converted to
        #[arg(long, default_value = "utf-8")]
        destination_encoding: String,

        /// Report what would be renamed without changing anything
        #[arg(long)]
        dry_run: bool,
    },
}
