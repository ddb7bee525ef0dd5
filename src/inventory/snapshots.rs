// src/inventory/snapshots.rs

//! Parser for `restic snapshots` output
//!
//! ```text
//! ID        Time                 Host        Tags        Paths
//! ------------------------------------------------------------------
//! eabbd6d7  2015-09-17 18:44:09  t420                    /tmp/backup
//! ------------------------------------------------------------------
//! 1 snapshots
//! ```

use crate::timestamp::Timestamp;
use regex::Regex;
use std::sync::LazyLock;

static SNAPSHOT_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-f]{8,64})\s+(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})(?:\s|$)")
        .expect("static regex")
});

static SUMMARY_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+ snapshots?$").expect("static regex"));

/// Parse snapshot listing lines into an ordered timestamp sequence
///
/// Rows that do not have the snapshot column shape are skipped, so trailing
/// blank lines or tag continuation rows never fail the parse.
pub fn parse_snapshots<S: AsRef<str>>(lines: &[S]) -> Vec<Timestamp> {
    let mut snapshots = Vec::new();

    for line in lines {
        let line = line.as_ref().trim();
        if is_structural(line) {
            continue;
        }

        let Some(caps) = SNAPSHOT_ROW.captures(line) else {
            continue;
        };
        // The row regex only admits well formed dates, an invalid calendar
        // date (2015-02-30) is treated like any other foreign row
        if let Ok(ts) = Timestamp::parse_store(&caps[2]) {
            snapshots.push(ts);
        }
    }

    snapshots
}

fn is_structural(line: &str) -> bool {
    line.is_empty()
        || line.starts_with("ID ")
        || line.chars().all(|c| c == '-')
        || SUMMARY_LINE.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let text = "ID        Time                 Host        Tags        Paths
------------------------------------------------------------------------------------
eabbd6d7  2015-09-17 18:44:09  t420                    /tmp/tmp9hkeoq1wrb2a_unittest
bc42bec7  2015-09-17 18:45:04  t420                    /tmp/tmp9hkeoq1wrb2a_unittest
------------------------------------------------------------------------------------
2 snapshots
";
        let lines: Vec<&str> = text.split('\n').collect();
        let snapshots = parse_snapshots(&lines);
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].as_str(), "2015-09-17T18:44:09");
        assert_eq!(snapshots[1].as_str(), "2015-09-17T18:45:04");
    }

    #[test]
    fn test_tagged_rows_and_continuations() {
        let lines = [
            "ID        Time                 Host        Tags        Paths",
            "----------------------------------------------------------",
            "eabbd6d7  2015-10-01 08:00:00  t420        repaired    /srv/a",
            "                                           extra       /srv/b",
            "----------------------------------------------------------",
            "1 snapshot",
            "",
        ];
        let snapshots = parse_snapshots(&lines);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].as_str(), "2015-10-01T08:00:00");
    }

    #[test]
    fn test_empty_repository() {
        let lines: [&str; 0] = [];
        assert!(parse_snapshots(&lines).is_empty());
        assert!(parse_snapshots(&["0 snapshots", ""]).is_empty());
    }
}
