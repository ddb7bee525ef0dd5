// src/encoding/mod.rs

//! Filename encoding repair
//!
//! Trees restored from legacy captures can mix filenames written as raw
//! single-byte legacy text (ISO-8859-1 `r\xe9pertoire`) with names that are
//! already valid in the destination encoding (plain ASCII, or correct UTF-8).
//! The repair engine renames the former in place and leaves the latter alone.
//!
//! Names are handled as raw bytes throughout. A name is only decoded to decide
//! whether it is valid and to produce its replacement; it is never used as a
//! lookup key in decoded form.
//!
//! # Traversal
//!
//! Directories are processed top-down from an explicit worklist. A directory
//! that gets renamed is pushed under its new name, so its children are
//! visited whatever the rename did to the parent listing.

use crate::error::{Error, Result};
use crate::filesystem;
use crate::observer::ConversionObserver;
use encoding_rs::Encoding;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Default encoding of legacy filenames
pub const DEFAULT_SOURCE_ENCODING: &str = "iso-8859-1";

/// Default encoding filenames are normalized to
pub const DEFAULT_DESTINATION_ENCODING: &str = "utf-8";

/// Resolve an encoding label (`latin1`, `iso-8859-1`, `utf-8`, ...)
pub fn lookup_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::Config(format!("Unknown encoding: {}", label)))
}

/// One directory entry as seen by the repair pass
struct Entry {
    name: OsString,
    is_dir: bool,
}

/// Filename encoding repair engine
#[derive(Debug, Clone, Copy)]
pub struct EncodingRepair {
    source: &'static Encoding,
    destination: &'static Encoding,
    dry_run: bool,
}

impl EncodingRepair {
    pub fn new(source: &'static Encoding, destination: &'static Encoding) -> Self {
        Self {
            source,
            destination,
            dry_run: false,
        }
    }

    /// Build from encoding labels
    pub fn from_labels(source: &str, destination: &str) -> Result<Self> {
        Ok(Self::new(lookup_encoding(source)?, lookup_encoding(destination)?))
    }

    /// Detect and count only, without renaming or changing permissions
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn source(&self) -> &'static Encoding {
        self.source
    }

    pub fn destination(&self) -> &'static Encoding {
        self.destination
    }

    /// Check whether a raw name is valid in the destination encoding
    pub fn is_valid(&self, name: &[u8]) -> bool {
        self.destination
            .decode_without_bom_handling_and_without_replacement(name)
            .is_some()
    }

    /// Compute the destination-encoded replacement for a raw name
    ///
    /// Returns `Ok(None)` when the name is already valid.
    pub fn transcode(&self, name: &[u8]) -> std::result::Result<Option<Vec<u8>>, String> {
        if self.is_valid(name) {
            return Ok(None);
        }

        let text = self
            .source
            .decode_without_bom_handling_and_without_replacement(name)
            .ok_or_else(|| {
                format!(
                    "name decodes neither as {} nor as {}",
                    self.destination.name(),
                    self.source.name()
                )
            })?;

        let (encoded, _, unmappable) = self.destination.encode(&text);
        if unmappable {
            return Err(format!(
                "'{}' cannot be represented in {}",
                text,
                self.destination.name()
            ));
        }
        Ok(Some(encoded.into_owned()))
    }

    /// Normalize every filename below `root`
    ///
    /// Returns the number of entries renamed (files and directories). `root`
    /// itself is never renamed. Renames already performed when an error is
    /// hit are kept.
    pub fn repair(&self, root: &Path, observer: &dyn ConversionObserver) -> Result<usize> {
        observer.message(&format!(
            "Change tree encoding of {} ({} => {}){}",
            root.display(),
            self.source.name(),
            self.destination.name(),
            if self.dry_run { " [dry run]" } else { "" }
        ));

        let mut renamed = 0;
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut parent_checked = false;

            for entry in list_entries(&dir)? {
                let new_name = self
                    .transcode(entry.name.as_bytes())
                    .map_err(|reason| Error::encoding(dir.join(&entry.name), reason))?;

                let Some(new_name) = new_name else {
                    if entry.is_dir {
                        pending.push(dir.join(&entry.name));
                    }
                    continue;
                };

                if !parent_checked {
                    self.prepare_parent(&dir, observer)?;
                    parent_checked = true;
                }

                let from = dir.join(&entry.name);
                let to = dir.join(OsStr::from_bytes(&new_name));
                if fs::symlink_metadata(&to).is_ok() {
                    return Err(Error::encoding(
                        &from,
                        format!("target name already exists: {}", to.display()),
                    ));
                }

                observer.renamed(&from, &to, self.dry_run);
                renamed += 1;

                let descend_into = if self.dry_run {
                    from
                } else {
                    fs::rename(&from, &to)?;
                    to
                };
                if entry.is_dir {
                    pending.push(descend_into);
                }
            }
        }

        observer.message(&format!("{} entries renamed in {}", renamed, root.display()));
        Ok(renamed)
    }

    /// Count entries below `root` whose names are invalid in the
    /// destination encoding, without modifying anything
    pub fn count_invalid(&self, root: &Path) -> Result<usize> {
        let mut count = 0;
        let mut pending = vec![root.to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in list_entries(&dir)? {
                if !self.is_valid(entry.name.as_bytes()) {
                    count += 1;
                }
                if entry.is_dir {
                    pending.push(dir.join(&entry.name));
                }
            }
        }
        Ok(count)
    }

    fn prepare_parent(&self, dir: &Path, observer: &dyn ConversionObserver) -> Result<()> {
        if self.dry_run {
            if !filesystem::is_owner_writable(dir)? {
                observer.not_writable(dir, false);
            }
        } else if filesystem::ensure_owner_writable(dir)? {
            observer.not_writable(dir, true);
        }
        Ok(())
    }
}

/// Immediate children of `dir`, sorted by raw name
///
/// Symlinks are reported as non-directories and never followed.
fn list_entries(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir)? {
        let item = item?;
        let is_dir = item.file_type()?.is_dir();
        entries.push(Entry {
            name: item.file_name(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    Ok(entries)
}
