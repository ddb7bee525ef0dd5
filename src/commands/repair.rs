// src/commands/repair.rs

//! Repair command - normalize filename encodings of an existing tree
//!
//! Useful to fix a restored tree by hand, or with `--dry-run` to find out
//! whether a legacy repository needs `convert --repair-encoding` at all.

use anyhow::{Context, Result};
use rdiff2restic::{EncodingRepair, LogObserver};
use std::path::Path;
use tracing::info;

/// Repair filename encodings below `directory`
pub fn cmd_repair(
    directory: &Path,
    source_encoding: &str,
    destination_encoding: &str,
    dry_run: bool,
) -> Result<()> {
    if !directory.is_dir() {
        return Err(anyhow::anyhow!("Not a directory: {}", directory.display()));
    }

    let repair = EncodingRepair::from_labels(source_encoding, destination_encoding)?
        .dry_run(dry_run);
    info!(
        "Repairing {} ({} => {}, dry_run={})",
        directory.display(),
        repair.source().name(),
        repair.destination().name(),
        dry_run
    );

    let renamed = repair
        .repair(directory, &LogObserver)
        .with_context(|| format!("Failed to repair {}", directory.display()))?;

    if dry_run {
        println!("[DRY RUN] {} entries would be renamed", renamed);
    } else {
        println!("{} entries renamed", renamed);
    }
    Ok(())
}
