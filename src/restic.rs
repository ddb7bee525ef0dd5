// src/restic.rs

//! restic (new store) invocation
//!
//! Lists the snapshots of a repository and commits a directory as a new
//! snapshot with an explicit historical time.

use crate::error::{Error, Result};
use crate::inventory::parse_snapshots;
use crate::runner::{CommandRunner, CommandSpec};
use crate::timestamp::Timestamp;
use std::path::Path;
use tracing::debug;

/// Default restic executable
pub const DEFAULT_BINARY: &str = "restic";

/// Tag attached to snapshots whose filenames were repaired
pub const DEFAULT_REPAIRED_TAG: &str = "repaired";

/// New store access through the restic command line
pub struct Restic<'a> {
    runner: &'a dyn CommandRunner,
    binary: String,
    repaired_tag: String,
}

impl<'a> Restic<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            binary: DEFAULT_BINARY.to_string(),
            repaired_tag: DEFAULT_REPAIRED_TAG.to_string(),
        }
    }

    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn repaired_tag(mut self, tag: impl Into<String>) -> Self {
        self.repaired_tag = tag.into();
        self
    }

    fn base_command(&self, repository: &Path, password_file: &Path) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .arg("--repo")
            .arg(repository)
            .arg("--password-file")
            .arg(password_file)
    }

    /// List snapshot times of `repository` in listing order
    pub fn list_snapshots(&self, repository: &Path, password_file: &Path) -> Result<Vec<Timestamp>> {
        let spec = self.base_command(repository, password_file).arg("snapshots");
        let output = self.runner.run(&spec)?;
        if !output.is_success() {
            return Err(Error::Command {
                program: self.binary.clone(),
                reason: format!(
                    "listing snapshots of {}: {}",
                    repository.display(),
                    output.failure_reason()
                ),
            });
        }

        let snapshots = parse_snapshots(&output.stdout_lines());
        debug!("Found {} snapshots in {}", snapshots.len(), repository.display());
        Ok(snapshots)
    }

    /// Commit `source_directory` as a snapshot recorded at `timestamp`
    ///
    /// The snapshot time is forced to `timestamp`, never the current time.
    /// Repaired snapshots carry the repaired tag.
    pub fn create(
        &self,
        repository: &Path,
        timestamp: &Timestamp,
        source_directory: &Path,
        password_file: &Path,
        repaired: bool,
    ) -> Result<()> {
        if !password_file.is_file() {
            return Err(Error::SnapshotCreate(format!(
                "password file is not readable: {}",
                password_file.display()
            )));
        }

        let mut spec = self
            .base_command(repository, password_file)
            .arg("backup")
            .arg("--time")
            .arg(timestamp.to_store_time());
        if repaired {
            spec = spec.arg("--tag").arg(&self.repaired_tag);
        }
        let spec = spec.arg(".").current_dir(source_directory);

        debug!("Creating snapshot {} from {}", timestamp, source_directory.display());
        let output = self
            .runner
            .run(&spec)
            .map_err(|e| Error::SnapshotCreate(e.to_string()))?;

        if !output.is_success() {
            return Err(Error::SnapshotCreate(format!(
                "{} at {}: {}",
                repository.display(),
                timestamp,
                output.failure_reason()
            )));
        }
        Ok(())
    }
}
