use std::ffi::{OsStr, OsString};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;

/// The kind of object found at a location. Symbolic links are never followed,
/// so a link to a directory is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Other,
}

/// Attributes of a single location as reported by a [`Filesystem`].
///
/// `name` and `display_name` are optional because not every backend can
/// provide them for every location; the snapshot builder refuses entries
/// where either is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub kind: FileKind,
    pub name: Option<OsString>,
    pub display_name: Option<String>,
    pub size: u64,
    pub modified: FileTime,
}

/// Blocking access to a tree of locations.
///
/// Every method fails with a plain [`io::Error`]; callers attach the location
/// and the operation as context.
pub trait Filesystem {
    /// Queries the attributes of `location` without following symlinks.
    fn metadata(&self, location: &Path) -> io::Result<Metadata>;

    /// Lists the children of a directory with their attributes, without
    /// following symlinks. Order is unspecified.
    fn read_children(&self, location: &Path) -> io::Result<Vec<Metadata>>;

    fn open_read(&self, location: &Path) -> io::Result<Box<dyn Read>>;

    /// Creates an empty file, truncating whatever file is already there.
    fn create_empty(&self, location: &Path) -> io::Result<()>;

    /// Replaces the contents of `location` with everything readable from
    /// `contents`. Readers of `location` observe either the old or the new
    /// contents, never a mix.
    fn replace_contents(&self, location: &Path, contents: &mut dyn Read) -> io::Result<u64>;

    /// Removes a file, an empty directory or any other object.
    fn remove(&self, location: &Path) -> io::Result<()>;

    fn create_directory(&self, location: &Path) -> io::Result<()>;

    fn set_modified_time(&self, location: &Path, modified: FileTime) -> io::Result<()>;

    fn child_location(&self, parent: &Path, name: &OsStr) -> PathBuf {
        parent.join(name)
    }
}
