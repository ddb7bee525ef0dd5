// src/rdiff.rs

//! rdiff-backup (legacy repository) invocation
//!
//! Lists the increments of a repository and restores a single increment
//! into a fresh directory.

use crate::error::{Error, Result};
use crate::inventory::parse_increments;
use crate::runner::{CommandRunner, CommandSpec};
use crate::timestamp::Timestamp;
use std::path::Path;
use tracing::debug;

/// Default rdiff-backup executable
pub const DEFAULT_BINARY: &str = "rdiff-backup";

/// Legacy repository access through the rdiff-backup command line
pub struct RdiffBackup<'a> {
    runner: &'a dyn CommandRunner,
    binary: String,
}

impl<'a> RdiffBackup<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self::with_binary(runner, DEFAULT_BINARY)
    }

    pub fn with_binary(runner: &'a dyn CommandRunner, binary: impl Into<String>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    /// List the increments of `repository`, oldest first, current mirror last
    pub fn list_increments(&self, repository: &Path) -> Result<Vec<Timestamp>> {
        let spec = CommandSpec::new(&self.binary)
            .arg("--list-increments")
            .arg(repository);
        let output = self.runner.run(&spec)?;
        if !output.is_success() {
            return Err(Error::Command {
                program: self.binary.clone(),
                reason: format!(
                    "listing increments of {}: {}",
                    repository.display(),
                    output.failure_reason()
                ),
            });
        }

        let increments = parse_increments(&output.stdout_lines())?;
        debug!("Found {} increments in {}", increments.len(), repository.display());
        Ok(increments)
    }

    /// Restore the state of `repository` at `timestamp` into `destination`
    ///
    /// `destination` must not exist yet. Nothing is cleaned up on failure;
    /// the caller owns the destination.
    pub fn restore(&self, repository: &Path, destination: &Path, timestamp: &Timestamp) -> Result<()> {
        if destination.exists() {
            return Err(Error::Restore(format!(
                "destination already exists: {}",
                destination.display()
            )));
        }

        debug!(
            "Restoring {} as of {} into {}",
            repository.display(),
            timestamp,
            destination.display()
        );
        let spec = CommandSpec::new(&self.binary)
            .arg("--restore-as-of")
            .arg(timestamp.as_str())
            .arg(repository)
            .arg(destination);
        let output = self
            .runner
            .run(&spec)
            .map_err(|e| Error::Restore(e.to_string()))?;

        if !output.is_success() {
            return Err(Error::Restore(format!(
                "{} as of {}: {}",
                repository.display(),
                timestamp,
                output.failure_reason()
            )));
        }
        Ok(())
    }
}
