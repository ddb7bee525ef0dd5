// src/inventory/mod.rs

//! Inventories of both backup tools
//!
//! The legacy tool lists increments, the new store lists snapshots. Both are
//! reduced to ordered sequences of [`Timestamp`] so that the diff engine can
//! compute which increments still have to be migrated.
//!
//! [`Timestamp`]: crate::timestamp::Timestamp

mod diff;
mod increments;
mod snapshots;

pub use diff::increments_to_convert;
pub use increments::parse_increments;
pub use snapshots::parse_snapshots;
