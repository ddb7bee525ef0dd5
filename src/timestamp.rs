// src/timestamp.rs

//! Canonical capture timestamps
//!
//! Both inventories are reduced to `YYYY-MM-DDTHH:MM:SS` local time with
//! second precision. The canonical text is fixed width and zero padded, so
//! lexical order on it equals chronological order.

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const STORE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MIRROR_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// A point in time of the backup history
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(String);

impl Timestamp {
    /// Parse the canonical `YYYY-MM-DDTHH:MM:SS` form
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_with(s, CANONICAL_FORMAT)
    }

    /// Parse the new store's `YYYY-MM-DD HH:MM:SS` form
    pub fn parse_store(s: &str) -> Result<Self> {
        Self::parse_with(s, STORE_FORMAT)
    }

    /// Parse the legacy tool's human readable mirror date
    /// (`Thu Sep 17 18:45:04 2015`)
    pub fn parse_mirror(s: &str) -> Result<Self> {
        // Day of month is space padded, collapse runs of whitespace first
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::parse_with(&normalized, MIRROR_FORMAT)
    }

    fn parse_with(s: &str, format: &str) -> Result<Self> {
        let parsed = NaiveDateTime::parse_from_str(s.trim(), format)
            .map_err(|e| Error::Parse(format!("invalid timestamp '{}': {}", s.trim(), e)))?;
        Ok(Self::from_datetime(parsed))
    }

    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self(datetime.format(CANONICAL_FORMAT).to_string())
    }

    /// Canonical text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rendering accepted by the new store's `--time` override
    pub fn to_store_time(&self) -> String {
        self.0.replacen('T', " ", 1)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_roundtrip() {
        let ts = Timestamp::parse("2015-10-01T08:00:00").unwrap();
        assert_eq!(ts.as_str(), "2015-10-01T08:00:00");
        assert_eq!(ts.to_string(), "2015-10-01T08:00:00");
        assert_eq!(ts.to_store_time(), "2015-10-01 08:00:00");
    }

    #[test]
    fn test_parse_store_form() {
        let ts = Timestamp::parse_store("2015-09-17 18:44:09").unwrap();
        assert_eq!(ts.as_str(), "2015-09-17T18:44:09");
    }

    #[test]
    fn test_parse_mirror_form() {
        let ts = Timestamp::parse_mirror("Thu Sep 17 18:45:04 2015").unwrap();
        assert_eq!(ts.as_str(), "2015-09-17T18:45:04");

        // Single digit day as printed by ctime()
        let ts = Timestamp::parse_mirror("Mon Sep  7 01:02:03 2015").unwrap();
        assert_eq!(ts.as_str(), "2015-09-07T01:02:03");
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(Timestamp::parse("2015-13-01T00:00:00").is_err());
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::parse_mirror("Thu Foo 17 18:45:04 2015").is_err());
    }

    #[test]
    fn test_lexical_order_is_chronological() {
        let a = Timestamp::parse("2015-09-30T23:59:59").unwrap();
        let b = Timestamp::parse("2015-10-01T08:00:00").unwrap();
        assert!(a < b);
    }
}
