// src/conversion/workdir.rs

//! Ephemeral working directory of a conversion job

use crate::filesystem;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PREFIX: &str = "rdiff2restic-";
const TREE: &str = "tree";

/// Scratch directory owned by one conversion job
///
/// The increment is restored into a `tree` subdirectory that does not exist
/// until the restore creates it. The whole directory is removed when the
/// guard is closed or dropped, including restored read-only directories.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl WorkDir {
    /// Create a fresh directory under `parent`, or the system temp dir
    pub fn create(parent: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore destination inside the working directory
    pub fn tree(&self) -> PathBuf {
        self.path().join(TREE)
    }

    /// Remove the directory, reporting failures
    pub fn close(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => filesystem::remove_tree(dir.path()),
            None => Ok(()),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let _ = filesystem::remove_tree(dir.path());
        }
    }
}
