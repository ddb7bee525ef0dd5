// src/error.rs

//! Error types for the conversion pipeline

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by inventory parsing, restore, repair and snapshot creation
#[derive(Error, Debug)]
pub enum Error {
    /// Inventory text could not be trusted
    #[error("Failed to parse inventory: {0}")]
    Parse(String),

    /// Legacy restore failed or its destination already existed
    #[error("Restore failed: {0}")]
    Restore(String),

    /// A filename could not be normalized
    #[error("Encoding error at {path}: {reason}")]
    Encoding { path: PathBuf, reason: String },

    /// Snapshot commit into the new store failed
    #[error("Snapshot creation failed: {0}")]
    SnapshotCreate(String),

    /// External tool could not be spawned or reported failure
    #[error("Command '{program}' failed: {reason}")]
    Command { program: String, reason: String },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn encoding(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Encoding {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error came from the repair engine
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding { .. })
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, Error>;
