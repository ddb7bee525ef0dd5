// src/inventory/increments.rs

//! Parser for `rdiff-backup --list-increments` output
//!
//! ```text
//! Found 1 increments:
//!     increments.2015-09-17T18:44:09+03:00.dir   Thu Sep 17 18:44:09 2015
//! Current mirror: Thu Sep 17 18:45:04 2015
//! ```

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use regex::Regex;
use std::sync::LazyLock;

static INCREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*increments\.(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})(?:[+-]\d{2}:\d{2}|Z)?\.dir\b")
        .expect("static regex")
});

const MIRROR_PREFIX: &str = "Current mirror:";

/// Parse increment listing lines into an ordered timestamp sequence
///
/// Increment lines keep their order; the current mirror is always appended
/// last since it is the most recent state of the repository.
pub fn parse_increments<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Timestamp>> {
    let mut increments = Vec::new();
    let mut mirror = None;
    let mut saw_content = false;

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        saw_content = true;

        if let Some(caps) = INCREMENT_LINE.captures(line) {
            increments.push(Timestamp::parse(&caps[1])?);
        } else if let Some(rest) = line.trim_start().strip_prefix(MIRROR_PREFIX) {
            mirror = Some(Timestamp::parse_mirror(rest)?);
        }
    }

    increments.extend(mirror);

    if saw_content && increments.is_empty() {
        return Err(Error::Parse(
            "no increment or current mirror line found in listing".to_string(),
        ));
    }

    Ok(increments)
}
