//! Access to the trees being synchronized.
//!
//! Everything the snapshot builder and the synchronizer do to a tree goes
//! through the [`Filesystem`] trait, addressed by location. [`LocalFilesystem`]
//! is the implementation backed by the operating system.

mod filesystem;
mod local;

pub use filesystem::{FileKind, Filesystem, Metadata};
pub use local::LocalFilesystem;

/// Buffer size used when streaming file contents.
pub const TRANSFER_CHUNK_SIZE: usize = 2 * 1024 * 1024;
