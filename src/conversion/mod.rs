// src/conversion/mod.rs

//! Conversion driver
//!
//! Migrates every rdiff-backup increment missing from the restic repository,
//! one job at a time, oldest first.
//!
//! # Job Lifecycle
//!
//! ```text
//! PENDING -> RESTORING -> [REPAIRING] -> SNAPSHOTTING -> DONE
//!     \___________\_____________\______________\______-> FAILED
//! ```
//!
//! The set of increments to convert is recomputed from both live inventories
//! at the start of every run. There is no checkpoint: an interrupted run is
//! resumed simply by running again, since already committed increments show
//! up as snapshots and drop out of the diff.

mod workdir;

pub use workdir::WorkDir;

use crate::config::ConversionConfig;
use crate::encoding::EncodingRepair;
use crate::error::{Error, Result};
use crate::inventory::increments_to_convert;
use crate::observer::ConversionObserver;
use crate::rdiff::RdiffBackup;
use crate::restic::Restic;
use crate::runner::CommandRunner;
use crate::timestamp::Timestamp;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// State of a single conversion job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    /// Scheduled, nothing done yet
    Pending,
    /// Legacy increment being restored into the working directory
    Restoring,
    /// Filename encodings being normalized
    Repairing,
    /// Working directory being committed to the new store
    Snapshotting,
    /// Snapshot committed, working directory removed
    Done,
    /// A step failed, working directory removed
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Restoring => "restoring",
            Self::Repairing => "repairing",
            Self::Snapshotting => "snapshotting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with the rest of the batch after a failed job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failed increment
    #[default]
    Abort,
    /// Report the failure and move on to the next increment
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(Error::Config(format!(
                "Invalid failure policy '{}', expected abort or continue",
                other
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => f.write_str("abort"),
            Self::Continue => f.write_str("continue"),
        }
    }
}

/// A successfully converted increment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedIncrement {
    pub timestamp: Timestamp,
    /// Entries renamed by the encoding repair
    pub renamed: usize,
    /// Whether the snapshot was tagged as repaired
    pub repaired: bool,
}

/// A failed conversion job
#[derive(Debug, thiserror::Error)]
#[error("{timestamp}: failed during {step}: {error}")]
pub struct JobFailure {
    pub timestamp: Timestamp,
    /// State the job was in when it failed
    pub step: JobState,
    #[source]
    pub error: Error,
}

/// Outcome of a conversion run
#[derive(Debug, Default)]
pub struct ConversionReport {
    pub converted: Vec<ConvertedIncrement>,
    pub failed: Vec<JobFailure>,
    /// Increments left untouched because the batch was aborted
    pub skipped: Vec<Timestamp>,
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn aborted(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn repaired_count(&self) -> usize {
        self.converted.iter().filter(|c| c.repaired).count()
    }
}

/// Tracks the state of one job and reports transitions
struct ConversionJob<'a> {
    timestamp: &'a Timestamp,
    state: JobState,
    observer: &'a dyn ConversionObserver,
}

impl<'a> ConversionJob<'a> {
    fn new(timestamp: &'a Timestamp, observer: &'a dyn ConversionObserver) -> Self {
        observer.job_state(timestamp, JobState::Pending);
        Self {
            timestamp,
            state: JobState::Pending,
            observer,
        }
    }

    fn enter(&mut self, state: JobState) {
        self.state = state;
        self.observer.job_state(self.timestamp, state);
    }

    fn fail(mut self, error: Error) -> JobFailure {
        let step = self.state;
        self.observer.job_failed(self.timestamp, step, &error.to_string());
        self.enter(JobState::Failed);
        JobFailure {
            timestamp: self.timestamp.clone(),
            step,
            error,
        }
    }
}

/// Drives increments from the legacy repository into the new store
pub struct Converter<'a> {
    rdiff: RdiffBackup<'a>,
    restic: Restic<'a>,
    observer: &'a dyn ConversionObserver,
    legacy_repository: PathBuf,
    restic_repository: PathBuf,
    password_file: PathBuf,
    repair: Option<EncodingRepair>,
    policy: FailurePolicy,
    work_dir: Option<PathBuf>,
}

impl<'a> Converter<'a> {
    /// Create a converter with default tools, no repair and abort-on-failure
    pub fn new(
        runner: &'a dyn CommandRunner,
        observer: &'a dyn ConversionObserver,
        legacy_repository: impl Into<PathBuf>,
        restic_repository: impl Into<PathBuf>,
        password_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rdiff: RdiffBackup::new(runner),
            restic: Restic::new(runner),
            observer,
            legacy_repository: legacy_repository.into(),
            restic_repository: restic_repository.into(),
            password_file: password_file.into(),
            repair: None,
            policy: FailurePolicy::default(),
            work_dir: None,
        }
    }

    /// Create a converter from configuration
    pub fn from_config(
        config: &ConversionConfig,
        runner: &'a dyn CommandRunner,
        observer: &'a dyn ConversionObserver,
        legacy_repository: impl Into<PathBuf>,
        restic_repository: impl Into<PathBuf>,
        password_file: impl Into<PathBuf>,
    ) -> Result<Self> {
        config.validate()?;
        let repair = if config.repair_encoding {
            Some(config.encoding_repair()?)
        } else {
            None
        };

        let mut converter = Self::new(
            runner,
            observer,
            legacy_repository,
            restic_repository,
            password_file,
        )
        .with_repair(repair)
        .with_policy(config.on_failure)
        .with_work_dir(config.work_dir.clone());
        converter.rdiff = RdiffBackup::with_binary(runner, config.rdiff_backup.clone());
        converter.restic = Restic::new(runner)
            .binary(config.restic.clone())
            .repaired_tag(config.repaired_tag.clone());
        Ok(converter)
    }

    /// Repair filename encodings of every restored increment
    ///
    /// The engine always runs for real here: a dry-run engine is switched
    /// to renaming, since the restored tree is committed right after.
    pub fn with_repair(mut self, repair: Option<EncodingRepair>) -> Self {
        self.repair = repair.map(|r| r.dry_run(false));
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Parent directory for working directories (system temp dir if `None`)
    pub fn with_work_dir(mut self, work_dir: Option<PathBuf>) -> Self {
        self.work_dir = work_dir;
        self
    }

    /// Increments present in the legacy repository but not in the new store
    pub fn pending(&self) -> Result<Vec<Timestamp>> {
        let increments = self.rdiff.list_increments(&self.legacy_repository)?;
        let snapshots = self
            .restic
            .list_snapshots(&self.restic_repository, &self.password_file)?;
        Ok(increments_to_convert(&increments, &snapshots))
    }

    /// Convert every pending increment, oldest first
    ///
    /// Inventory failures are returned as errors before any job starts. Job
    /// failures are collected in the report; with [`FailurePolicy::Abort`]
    /// the remaining increments are listed as skipped.
    pub fn run(&self) -> Result<ConversionReport> {
        let pending = self.pending()?;
        self.observer.message(&format!(
            "{} increments to convert from {} to {}",
            pending.len(),
            self.legacy_repository.display(),
            self.restic_repository.display()
        ));

        let mut report = ConversionReport::default();
        let mut remaining = pending.into_iter();

        while let Some(timestamp) = remaining.next() {
            match self.convert_increment(&timestamp) {
                Ok(converted) => report.converted.push(converted),
                Err(failure) => {
                    report.failed.push(failure);
                    if self.policy == FailurePolicy::Abort {
                        report.skipped.extend(remaining.by_ref());
                        break;
                    }
                }
            }
        }

        self.observer.message(&format!(
            "Converted {} increments ({} repaired), {} failed, {} skipped",
            report.converted.len(),
            report.repaired_count(),
            report.failed.len(),
            report.skipped.len()
        ));
        Ok(report)
    }

    /// Convert a single increment, regardless of the new store's contents
    ///
    /// The working directory is removed whatever the outcome.
    pub fn convert_increment(
        &self,
        timestamp: &Timestamp,
    ) -> std::result::Result<ConvertedIncrement, JobFailure> {
        let mut job = ConversionJob::new(timestamp, self.observer);

        let workdir = match WorkDir::create(self.work_dir.as_deref()) {
            Ok(workdir) => workdir,
            Err(e) => return Err(job.fail(e.into())),
        };

        let result = self.drive(&mut job, &workdir.tree());

        let workdir_path = workdir.path().to_path_buf();
        if let Err(e) = workdir.close() {
            self.observer.cleanup_failed(&workdir_path, &e.to_string());
        }

        match result {
            Ok(converted) => {
                job.enter(JobState::Done);
                Ok(converted)
            }
            Err(e) => Err(job.fail(e)),
        }
    }

    fn drive(&self, job: &mut ConversionJob<'_>, tree: &Path) -> Result<ConvertedIncrement> {
        let timestamp = job.timestamp;

        job.enter(JobState::Restoring);
        self.rdiff.restore(&self.legacy_repository, tree, timestamp)?;

        let mut renamed = 0;
        if let Some(repair) = &self.repair {
            job.enter(JobState::Repairing);
            renamed = repair.repair(tree, self.observer)?;
        }
        let repaired = renamed > 0;

        job.enter(JobState::Snapshotting);
        self.restic.create(
            &self.restic_repository,
            timestamp,
            tree,
            &self.password_file,
            repaired,
        )?;

        Ok(ConvertedIncrement {
            timestamp: timestamp.clone(),
            renamed,
            repaired,
        })
    }
}
