//! CSV snapshot storage and comparison.
//!
//! Each scrape is saved as `snapshot_<YYYY-MM-DD>.csv` in the snapshot
//! directory with columns index, Name, Brand, Price, Link, Storage.
//! Supports:
//! - Writing a snapshot, overwriting an earlier run from the same day
//! - Reading any snapshot file back, including older exports
//! - Listing snapshots newest first
//! - Comparing two snapshots by product link

pub mod diff;
pub mod snapshot;

pub use snapshot::{Snapshot, SnapshotFile, SnapshotStore};
