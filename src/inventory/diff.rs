// src/inventory/diff.rs

//! Increments still missing from the new store

use crate::timestamp::Timestamp;
use std::collections::HashSet;

/// Return every increment whose timestamp is absent from `snapshots`
///
/// Order of `increments` is preserved. Matching is exact on the canonical
/// text: two timestamps one second apart are distinct.
pub fn increments_to_convert(increments: &[Timestamp], snapshots: &[Timestamp]) -> Vec<Timestamp> {
    let converted: HashSet<&Timestamp> = snapshots.iter().collect();
    increments
        .iter()
        .filter(|ts| !converted.contains(ts))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(list: &[&str]) -> Vec<Timestamp> {
        list.iter().map(|s| Timestamp::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_partial_conversion() {
        let increments = ts(&["2015-10-01T08:00:00", "2015-10-01T09:00:00"]);
        let snapshots = ts(&["2015-10-01T09:00:00"]);
        let result = increments_to_convert(&increments, &snapshots);
        assert_eq!(result, ts(&["2015-10-01T08:00:00"]));
    }

    #[test]
    fn test_preserves_order_and_is_deterministic() {
        let increments = ts(&[
            "2015-10-01T07:00:00",
            "2015-10-01T08:00:00",
            "2015-10-01T09:00:00",
            "2015-10-01T10:00:00",
        ]);
        let snapshots = ts(&["2015-10-01T10:00:00", "2015-10-01T08:00:00"]);
        let first = increments_to_convert(&increments, &snapshots);
        let second = increments_to_convert(&increments, &snapshots);
        assert_eq!(first, ts(&["2015-10-01T07:00:00", "2015-10-01T09:00:00"]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_tolerance_window() {
        let increments = ts(&["2015-10-01T09:00:01"]);
        let snapshots = ts(&["2015-10-01T09:00:00"]);
        assert_eq!(increments_to_convert(&increments, &snapshots), increments);
    }

    #[test]
    fn test_empty_inputs() {
        let increments = ts(&["2015-10-01T08:00:00"]);
        assert_eq!(increments_to_convert(&increments, &[]), increments);
        assert!(increments_to_convert(&[], &increments).is_empty());
    }
}
