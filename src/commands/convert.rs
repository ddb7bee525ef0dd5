// src/commands/convert.rs

//! Convert and pending commands
//!
//! Both commands compute the increments missing from the restic repository.
//! `pending` only prints them; `convert` drives each one through restore,
//! optional encoding repair and snapshot creation.

use anyhow::{Context, Result};
use rdiff2restic::{
    ConversionConfig, ConversionReport, Converter, FailurePolicy, LogObserver, SystemRunner,
};
use std::path::PathBuf;
use tracing::info;

use crate::cli::RepoArgs;

/// Command line values taking precedence over the configuration file
#[derive(Debug, Default)]
pub struct ConvertOverrides {
    pub repair_encoding: bool,
    pub source_encoding: Option<String>,
    pub destination_encoding: Option<String>,
    pub on_failure: Option<FailurePolicy>,
    pub work_dir: Option<PathBuf>,
}

impl ConvertOverrides {
    fn apply(self, config: &mut ConversionConfig) -> Result<()> {
        if self.repair_encoding {
            config.repair_encoding = true;
        }
        if let Some(source) = self.source_encoding {
            config.source_encoding = source;
        }
        if let Some(destination) = self.destination_encoding {
            config.destination_encoding = destination;
        }
        if let Some(policy) = self.on_failure {
            config.on_failure = policy;
        }
        if let Some(work_dir) = self.work_dir {
            config.work_dir = Some(work_dir);
        }
        config.validate()?;
        Ok(())
    }
}

/// Convert every increment missing from the restic repository
///
/// Returns an error when any increment failed, after printing the report.
pub fn cmd_convert(repos: RepoArgs, overrides: ConvertOverrides) -> Result<()> {
    let mut config = ConversionConfig::load_or_default(repos.config.as_deref())?;
    overrides.apply(&mut config)?;

    info!(
        "Converting {} into {} (repair_encoding={}, on_failure={})",
        repos.legacy_repo.display(),
        repos.restic_repo.display(),
        config.repair_encoding,
        config.on_failure
    );

    let runner = SystemRunner::new();
    let observer = LogObserver;
    let converter = Converter::from_config(
        &config,
        &runner,
        &observer,
        &repos.legacy_repo,
        &repos.restic_repo,
        &repos.password_file,
    )?;

    let report = converter
        .run()
        .context("Failed to compute increments to convert")?;
    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} increment(s) failed to convert",
            report.failed.len()
        ))
    }
}

/// Print increments not yet converted, oldest first
pub fn cmd_pending(repos: RepoArgs) -> Result<()> {
    let config = ConversionConfig::load_or_default(repos.config.as_deref())?;

    let runner = SystemRunner::new();
    let observer = LogObserver;
    let converter = Converter::from_config(
        &config,
        &runner,
        &observer,
        &repos.legacy_repo,
        &repos.restic_repo,
        &repos.password_file,
    )?;

    let pending = converter.pending()?;
    if pending.is_empty() {
        println!("All increments are already converted.");
        return Ok(());
    }

    println!("{} increment(s) to convert:", pending.len());
    for timestamp in &pending {
        println!("  {}", timestamp);
    }
    Ok(())
}

fn print_report(report: &ConversionReport) {
    for converted in &report.converted {
        if converted.repaired {
            println!(
                "  [OK] {} ({} names repaired)",
                converted.timestamp, converted.renamed
            );
        } else {
            println!("  [OK] {}", converted.timestamp);
        }
    }
    for failure in &report.failed {
        println!("  [FAILED] {} during {}: {}", failure.timestamp, failure.step, failure.error);
    }
    for skipped in &report.skipped {
        println!("  [SKIPPED] {}", skipped);
    }

    println!();
    println!(
        "Converted: {}  Repaired: {}  Failed: {}  Skipped: {}",
        report.converted.len(),
        report.repaired_count(),
        report.failed.len(),
        report.skipped.len()
    );
}
