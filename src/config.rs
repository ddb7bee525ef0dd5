// src/config.rs

//! Conversion configuration
//!
//! All settings have defaults, so a configuration file is optional. Values
//! from a file are overridden by command line flags.
//!
//! # Example config.toml
//!
//! ```toml
//! rdiff_backup = "/usr/local/bin/rdiff-backup"
//! restic = "restic"
//!
//! repair_encoding = true
//! source_encoding = "iso-8859-1"
//! destination_encoding = "utf-8"
//! repaired_tag = "repaired"
//!
//! # Stop at the first failed increment, or "continue"
//! on_failure = "abort"
//!
//! # Parent directory for restored increments (system temp dir if unset)
//! work_dir = "/var/tmp"
//! ```

use crate::conversion::FailurePolicy;
use crate::encoding::{self, EncodingRepair};
use crate::error::{Error, Result};
use crate::{rdiff, restic};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings for a conversion run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// rdiff-backup executable
    pub rdiff_backup: String,
    /// restic executable
    pub restic: String,
    /// Repair filename encodings before committing each increment
    pub repair_encoding: bool,
    pub source_encoding: String,
    pub destination_encoding: String,
    /// Tag attached to snapshots whose tree needed repairs
    pub repaired_tag: String,
    pub on_failure: FailurePolicy,
    /// Parent directory of ephemeral working directories
    pub work_dir: Option<PathBuf>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            rdiff_backup: rdiff::DEFAULT_BINARY.to_string(),
            restic: restic::DEFAULT_BINARY.to_string(),
            repair_encoding: false,
            source_encoding: encoding::DEFAULT_SOURCE_ENCODING.to_string(),
            destination_encoding: encoding::DEFAULT_DESTINATION_ENCODING.to_string(),
            repaired_tag: restic::DEFAULT_REPAIRED_TAG.to_string(),
            on_failure: FailurePolicy::default(),
            work_dir: None,
        }
    }
}

impl ConversionConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.encoding_repair()?;
        if self.repaired_tag.trim().is_empty() {
            return Err(Error::Config("repaired_tag must not be empty".to_string()));
        }
        if self.rdiff_backup.is_empty() || self.restic.is_empty() {
            return Err(Error::Config("tool executables must not be empty".to_string()));
        }
        Ok(())
    }

    /// Repair engine for the configured encodings
    pub fn encoding_repair(&self) -> Result<EncodingRepair> {
        EncodingRepair::from_labels(&self.source_encoding, &self.destination_encoding)
    }
}
