// src/filesystem/mod.rs

//! Filesystem helpers for restored trees
//!
//! Legacy captures frequently restore archival directories without owner
//! write permission. Renaming entries inside such a directory, or deleting
//! the tree afterwards, first requires granting the owner the missing bits.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

const OWNER_WRITE: u32 = 0o200;
const OWNER_ALL: u32 = 0o700;

/// Check whether the owner write bit is set on `path`
pub fn is_owner_writable(path: &Path) -> io::Result<bool> {
    let mode = fs::metadata(path)?.permissions().mode();
    Ok(mode & OWNER_WRITE != 0)
}

/// Grant owner write permission on `dir` if it is missing
///
/// Returns true when the mode was changed. The change is permanent.
pub fn ensure_owner_writable(dir: &Path) -> io::Result<bool> {
    let mut perms = fs::metadata(dir)?.permissions();
    let mode = perms.mode();
    if mode & OWNER_WRITE != 0 {
        return Ok(false);
    }

    perms.set_mode(mode | OWNER_WRITE);
    fs::set_permissions(dir, perms)?;
    debug!("Granted owner write on {} ({:o})", dir.display(), mode | OWNER_WRITE);
    Ok(true)
}

/// Remove a directory tree, including read-only directories
///
/// Every directory is made owner readable, writable and searchable before it
/// is listed, top-down, then the tree is removed recursively. This covers
/// directories restored without read or search permission. A missing `path`
/// is not an error.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    }

    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        grant_owner_all(&dir)?;

        // One level at a time: a child is only listed once its own mode is fixed
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => continue,
                Err(e) => return Err(e.into()),
            };
            if entry.file_type().is_dir() {
                pending.push(entry.into_path());
            }
        }
    }

    fs::remove_dir_all(path)
}

fn grant_owner_all(dir: &Path) -> io::Result<()> {
    let mut perms = fs::symlink_metadata(dir)?.permissions();
    let mode = perms.mode();
    if mode & OWNER_ALL != OWNER_ALL {
        perms.set_mode(mode | OWNER_ALL);
        fs::set_permissions(dir, perms)?;
        debug!("Granted owner rwx on {} for removal", dir.display());
    }
    Ok(())
}
