//! In-memory snapshots of filesystem trees.
//!
//! A snapshot is a tree of [`Entry`] values built top-down from a single walk
//! of a location. Parents exclusively own their children and children are
//! addressed by raw name only.

mod builder;
mod entry;
mod listing;

pub use builder::{SnapshotBuilder, SnapshotError};
pub use entry::{Entry, EntryKind};
pub use listing::display_path;
