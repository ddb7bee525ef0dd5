// src/lib.rs

//! rdiff2restic
//!
//! Migrates an rdiff-backup increment history into a restic repository,
//! one increment at a time, preserving every historical point in time and
//! optionally repairing legacy single-byte filename encodings on the way.
//!
//! # Architecture
//!
//! - Inventories: both tools' listings reduced to canonical timestamps
//! - Diff: increments not yet present as snapshots, in history order
//! - Restore: one increment materialized into an ephemeral directory
//! - Repair: filename bytes normalized to the destination encoding in place
//! - Create: the directory committed as a snapshot at its original time
//! - Converter: the per-increment state machine tying these together
//!
//! External tools are reached through the [`runner::CommandRunner`]
//! capability and every event is reported to an injected
//! [`observer::ConversionObserver`].

pub mod config;
pub mod conversion;
pub mod encoding;
mod error;
pub mod filesystem;
pub mod inventory;
pub mod observer;
pub mod rdiff;
pub mod restic;
pub mod runner;
pub mod timestamp;

pub use config::ConversionConfig;
pub use conversion::{
    ConversionReport, ConvertedIncrement, Converter, FailurePolicy, JobFailure, JobState,
};
pub use encoding::EncodingRepair;
pub use error::{Error, Result};
pub use inventory::{increments_to_convert, parse_increments, parse_snapshots};
pub use observer::{CallbackObserver, ConversionEvent, ConversionObserver, LogObserver, SilentObserver};
pub use rdiff::RdiffBackup;
pub use restic::Restic;
pub use runner::{CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use timestamp::Timestamp;
