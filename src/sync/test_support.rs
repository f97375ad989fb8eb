use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::filesystem::{Filesystem, LocalFilesystem, Metadata};
use crate::snapshot::{Entry, SnapshotBuilder};
use crate::sync::{Reporter, SyncEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Metadata,
    ReadChildren,
    OpenRead,
    CreateEmpty,
    ReplaceContents,
    Remove,
    CreateDirectory,
    SetModifiedTime,
}

/// [`LocalFilesystem`] that fails one operation at one location.
pub(crate) struct FaultyFilesystem {
    inner: LocalFilesystem,
    failure: Option<(Operation, PathBuf)>,
    hide_display_names: bool,
}

impl FaultyFilesystem {
    pub(crate) fn new(operation: Operation, location: &Path) -> Self {
        Self {
            inner: LocalFilesystem,
            failure: Some((operation, location.to_path_buf())),
            hide_display_names: false,
        }
    }

    pub(crate) fn without_display_names() -> Self {
        Self {
            inner: LocalFilesystem,
            failure: None,
            hide_display_names: true,
        }
    }

    fn check(&self, operation: Operation, location: &Path) -> io::Result<()> {
        match &self.failure {
            Some((failing, target)) if *failing == operation && target == location => Err(
                io::Error::new(io::ErrorKind::PermissionDenied, format!("injected {operation:?} failure")),
            ),
            _ => Ok(()),
        }
    }

    fn scrub(&self, mut metadata: Metadata) -> Metadata {
        if self.hide_display_names {
            metadata.display_name = None;
        }
        metadata
    }
}

impl Filesystem for FaultyFilesystem {
    fn metadata(&self, location: &Path) -> io::Result<Metadata> {
        self.check(Operation::Metadata, location)?;
        self.inner.metadata(location).map(|metadata| self.scrub(metadata))
    }

    fn read_children(&self, location: &Path) -> io::Result<Vec<Metadata>> {
        self.check(Operation::ReadChildren, location)?;
        let children = self.inner.read_children(location)?;
        Ok(children.into_iter().map(|metadata| self.scrub(metadata)).collect())
    }

    fn open_read(&self, location: &Path) -> io::Result<Box<dyn Read>> {
        self.check(Operation::OpenRead, location)?;
        self.inner.open_read(location)
    }

    fn create_empty(&self, location: &Path) -> io::Result<()> {
        self.check(Operation::CreateEmpty, location)?;
        self.inner.create_empty(location)
    }

    fn replace_contents(&self, location: &Path, contents: &mut dyn Read) -> io::Result<u64> {
        self.check(Operation::ReplaceContents, location)?;
        self.inner.replace_contents(location, contents)
    }

    fn remove(&self, location: &Path) -> io::Result<()> {
        self.check(Operation::Remove, location)?;
        self.inner.remove(location)
    }

    fn create_directory(&self, location: &Path) -> io::Result<()> {
        self.check(Operation::CreateDirectory, location)?;
        self.inner.create_directory(location)
    }

    fn set_modified_time(&self, location: &Path, modified: FileTime) -> io::Result<()> {
        self.check(Operation::SetModifiedTime, location)?;
        self.inner.set_modified_time(location, modified)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub events: Vec<SyncEvent>,
}

impl RecordingReporter {
    pub(crate) fn updated_paths(&self) -> Vec<String> {
        let mut paths = self
            .events
            .iter()
            .filter_map(|event| match event {
                SyncEvent::Updated { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        paths.sort();
        paths
    }

    pub(crate) fn updated_directories(&self) -> Vec<String> {
        let mut paths = self
            .events
            .iter()
            .filter_map(|event| match event {
                SyncEvent::DirectoryUpdated { path } => Some(path.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        paths.sort();
        paths
    }

    pub(crate) fn deleted_locations(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SyncEvent::Deleted { location } => Some(location.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn skipped_locations(&self) -> Vec<PathBuf> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SyncEvent::Skipped { location } => Some(location.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, event: SyncEvent) {
        self.events.push(event);
    }
}

/// Writes `contents` to `root/relative`, creating missing parent directories.
pub(crate) fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(&path, contents).expect("Failed to write file");
    path
}

pub(crate) fn set_mtime(path: &Path, unix_seconds: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(unix_seconds, 0))
        .expect("Failed to set modified time");
}

pub(crate) fn snapshot(path: &Path, want_checksum: bool) -> Entry {
    SnapshotBuilder::new(&LocalFilesystem, want_checksum)
        .build(path)
        .expect("Failed to build snapshot")
}
