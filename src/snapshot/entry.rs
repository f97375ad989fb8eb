use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::mem;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::checksum::Checksum;

/// One node of a snapshot tree.
///
/// An entry owns its location and, for directories, its children. Dropping an
/// entry drops its whole subtree.
#[derive(Debug, PartialEq, Eq)]
pub struct Entry {
    name: OsString,
    display_name: String,
    modified: FileTime,
    location: PathBuf,
    kind: EntryKind,
}

/// Represents the type of a snapshot node
#[derive(Debug, PartialEq, Eq)]
pub enum EntryKind {
    File {
        size: u64,
        /// Only present when the snapshot was built with checksums.
        checksum: Option<Checksum>,
    },
    Directory {
        children: HashMap<OsString, Entry>,
    },
    /// Symlinks, devices, sockets and anything else that is neither a regular
    /// file nor a directory.
    Other,
}

impl Entry {
    pub fn new(
        name: OsString,
        display_name: String,
        modified: FileTime,
        location: PathBuf,
        kind: EntryKind,
    ) -> Self {
        Self {
            name,
            display_name,
            modified,
            location,
            kind,
        }
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn modified(&self) -> FileTime {
        self.modified
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn kind(&self) -> &EntryKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut EntryKind {
        &mut self.kind
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    pub fn children(&self) -> Option<&HashMap<OsString, Entry>> {
        match &self.kind {
            EntryKind::Directory { children } => Some(children),
            _ => None,
        }
    }

    pub fn child(&self, name: impl AsRef<OsStr>) -> Option<&Entry> {
        self.children()?.get(name.as_ref())
    }

    pub(crate) fn set_modified(&mut self, modified: FileTime) {
        self.modified = modified;
    }

    pub(crate) fn into_parts(self) -> (PathBuf, EntryKind) {
        (self.location, self.kind)
    }

    /// Moves this entry's contents out into a standalone entry for the same
    /// location, leaving `Other` behind. Used right before deleting a subtree
    /// whose parent slot must stay in place.
    pub(crate) fn detach(&mut self) -> Entry {
        Entry {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            modified: self.modified,
            location: self.location.clone(),
            kind: mem::replace(&mut self.kind, EntryKind::Other),
        }
    }
}
