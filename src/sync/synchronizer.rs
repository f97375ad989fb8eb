use std::collections::{HashMap, hash_map};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use crate::ext::{BestEffortPathExt, FileTimeExt};
use crate::filesystem::Filesystem;
use crate::snapshot::{Entry, EntryKind, SnapshotBuilder, SnapshotError, display_path};
use crate::sync::deletion::{self, DeletionError};
use crate::sync::report::Tally;
use crate::sync::{CompareMode, Reporter, SyncEvent, SyncPolicy, SyncStats};

/// Converges a destination tree onto a source tree.
///
/// The destination snapshot is updated in place alongside every change made
/// on disk, so once a run succeeds it matches a fresh snapshot of the
/// destination. The source snapshot is never modified. A run stops at the
/// first error and does not roll back what it already did.
pub struct Synchronizer<'a> {
    fs: &'a dyn Filesystem,
    policy: SyncPolicy,
    tally: Tally<'a>,
}

impl<'a> Synchronizer<'a> {
    pub fn new(fs: &'a dyn Filesystem, policy: SyncPolicy, reporter: &'a mut dyn Reporter) -> Self {
        Self {
            fs,
            policy,
            tally: Tally::new(reporter),
        }
    }

    pub fn synchronize(mut self, dest: &mut Entry, src: &Entry) -> Result<SyncStats, SyncError> {
        debug!(
            "Synchronizing {} onto {} ({:?})",
            src.location().best_effort_path_display(),
            dest.location().best_effort_path_display(),
            self.policy
        );

        // A file given as source with a directory as destination is copied
        // into that directory instead of replacing it.
        let parent = dest.location().to_path_buf();
        let prefix = dest.display_name().to_owned();
        match (dest.kind_mut(), src.kind()) {
            (EntryKind::Directory { children }, EntryKind::File { .. }) => {
                self.copy_into_directory(children, &parent, src, &prefix)?
            }
            _ => self.reconcile(dest, src, None)?,
        }

        Ok(self.tally.stats())
    }

    fn copy_into_directory(
        &mut self,
        children: &mut HashMap<OsString, Entry>,
        parent: &Path,
        src: &Entry,
        prefix: &str,
    ) -> Result<(), SyncError> {
        match children.entry(src.name().to_os_string()) {
            hash_map::Entry::Occupied(slot) => self.reconcile(slot.into_mut(), src, Some(prefix)),
            hash_map::Entry::Vacant(slot) => {
                let location = self.fs.child_location(parent, src.name());
                let child = slot.insert(self.create_empty_file(&location)?);
                self.reconcile(child, src, Some(prefix))
            }
        }
    }

    fn reconcile(&mut self, dest: &mut Entry, src: &Entry, prefix: Option<&str>) -> Result<(), SyncError> {
        match src.kind() {
            EntryKind::Other => {
                self.skip(src);
                Ok(())
            }
            EntryKind::File { .. } => self.reconcile_file(dest, src, prefix),
            EntryKind::Directory { children } => self.reconcile_directory(dest, src, children, prefix, false),
        }
    }

    fn reconcile_file(&mut self, dest: &mut Entry, src: &Entry, prefix: Option<&str>) -> Result<(), SyncError> {
        let forced = match dest.kind() {
            EntryKind::File { .. } => false,
            EntryKind::Directory { .. } if !self.policy.delete_unwanted => {
                return DirectoryProtectionSnafu {
                    destination: dest.location(),
                    source_location: src.location(),
                }
                .fail();
            }
            EntryKind::Directory { .. } | EntryKind::Other => {
                self.replace_with_empty_file(dest)?;
                true
            }
        };

        self.sync_file(dest, src, prefix, forced)
    }

    fn sync_file(
        &mut self,
        dest: &mut Entry,
        src: &Entry,
        prefix: Option<&str>,
        forced: bool,
    ) -> Result<(), SyncError> {
        if !forced && !self.files_differ(dest, src) {
            debug!("{} is up to date", dest.location().best_effort_path_display());
            return Ok(());
        }

        let bytes = self.transfer(dest.location(), src.location())?;
        self.tally.report(SyncEvent::Updated {
            path: display_path(prefix, dest.display_name()),
            bytes,
        });

        if let (EntryKind::File { size, checksum }, EntryKind::File { checksum: copied, .. }) =
            (dest.kind_mut(), src.kind())
        {
            *size = bytes;
            *checksum = *copied;
        }
        self.propagate_modified_time(dest, src);
        Ok(())
    }

    fn files_differ(&self, dest: &Entry, src: &Entry) -> bool {
        let (
            EntryKind::File {
                size: dest_size,
                checksum: dest_checksum,
            },
            EntryKind::File {
                size: src_size,
                checksum: src_checksum,
            },
        ) = (dest.kind(), src.kind())
        else {
            return true;
        };

        match self.policy.compare {
            CompareMode::SizeOnly => dest_size != src_size,
            CompareMode::SizeAndTime => {
                dest_size != src_size || !dest.modified().same_second(&src.modified())
            }
            // A digest missing on either side cannot prove the files equal
            CompareMode::ChecksumOnly => match (dest_checksum, src_checksum) {
                (Some(dest_checksum), Some(src_checksum)) => dest_checksum != src_checksum,
                _ => true,
            },
        }
    }

    fn transfer(&self, destination: &Path, source: &Path) -> Result<u64, SyncError> {
        debug!(
            "Copying {} to {}",
            source.best_effort_path_display(),
            destination.best_effort_path_display()
        );
        let mut reader = self.fs.open_read(source).context(TransferSnafu {
            destination,
            source_location: source,
        })?;
        self.fs
            .replace_contents(destination, &mut reader)
            .context(TransferSnafu {
                destination,
                source_location: source,
            })
    }

    fn reconcile_directory(
        &mut self,
        dest: &mut Entry,
        src: &Entry,
        src_children: &HashMap<OsString, Entry>,
        prefix: Option<&str>,
        mut forced: bool,
    ) -> Result<(), SyncError> {
        if !dest.is_directory() {
            self.replace_with_directory(dest)?;
            forced = true;
        }

        let path = display_path(prefix, dest.display_name());
        let parent = dest.location().to_path_buf();
        let changed = forced
            || (self.policy.compare.compares_time() && !dest.modified().same_second(&src.modified()));

        if let EntryKind::Directory { children } = dest.kind_mut() {
            if self.policy.delete_unwanted {
                self.delete_unwanted(children, src_children)?;
            }
            if changed {
                self.tally.report(SyncEvent::DirectoryUpdated { path: path.clone() });
            }
            self.sync_children(children, &parent, src_children, &path)?;
        }

        self.propagate_modified_time(dest, src);
        Ok(())
    }

    fn delete_unwanted(
        &mut self,
        children: &mut HashMap<OsString, Entry>,
        wanted: &HashMap<OsString, Entry>,
    ) -> Result<(), SyncError> {
        let unwanted = children
            .keys()
            .filter(|name| !wanted.contains_key(*name))
            .cloned()
            .collect::<Vec<_>>();

        for name in unwanted {
            if let Some(child) = children.remove(&name) {
                deletion::delete(self.fs, child, &mut self.tally).context(DeletionSnafu)?;
            }
        }
        Ok(())
    }

    fn sync_children(
        &mut self,
        children: &mut HashMap<OsString, Entry>,
        parent: &Path,
        src_children: &HashMap<OsString, Entry>,
        path: &str,
    ) -> Result<(), SyncError> {
        let mut sources = src_children.values().collect::<Vec<_>>();
        sources.sort_by(|a, b| a.name().cmp(b.name()));

        for src_child in sources {
            match children.entry(src_child.name().to_os_string()) {
                hash_map::Entry::Occupied(slot) => {
                    self.reconcile(slot.into_mut(), src_child, Some(path))?
                }
                hash_map::Entry::Vacant(slot) => {
                    let location = self.fs.child_location(parent, src_child.name());
                    match src_child.kind() {
                        EntryKind::Other => self.skip(src_child),
                        EntryKind::File { .. } => {
                            let child = slot.insert(self.create_empty_file(&location)?);
                            self.sync_file(child, src_child, Some(path), true)?;
                        }
                        EntryKind::Directory {
                            children: grandchildren,
                        } => {
                            let child = slot.insert(self.create_directory(&location)?);
                            self.reconcile_directory(child, src_child, grandchildren, Some(path), true)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Deletes whatever `dest` is and leaves an empty file in its place.
    fn replace_with_empty_file(&mut self, dest: &mut Entry) -> Result<(), SyncError> {
        let location = self.delete_in_place(dest)?;
        *dest = self.create_empty_file(&location)?;
        Ok(())
    }

    /// Deletes whatever `dest` is and leaves an empty directory in its place.
    fn replace_with_directory(&mut self, dest: &mut Entry) -> Result<(), SyncError> {
        let location = self.delete_in_place(dest)?;
        *dest = self.create_directory(&location)?;
        Ok(())
    }

    /// On failure `dest` is left as `Other`, since part of it may be gone.
    fn delete_in_place(&mut self, dest: &mut Entry) -> Result<PathBuf, SyncError> {
        let doomed = dest.detach();
        let location = doomed.location().to_path_buf();
        debug!(
            "Replacing {} with an entry of another kind",
            location.best_effort_path_display()
        );
        deletion::delete(self.fs, doomed, &mut self.tally).context(DeletionSnafu)?;
        Ok(location)
    }

    fn create_empty_file(&self, location: &Path) -> Result<Entry, SyncError> {
        self.fs
            .create_empty(location)
            .context(CreateFileSnafu { location })?;
        self.fresh_entry(location)
    }

    fn create_directory(&self, location: &Path) -> Result<Entry, SyncError> {
        self.fs
            .create_directory(location)
            .context(CreateDirectorySnafu { location })?;
        self.fresh_entry(location)
    }

    fn fresh_entry(&self, location: &Path) -> Result<Entry, SyncError> {
        SnapshotBuilder::new(self.fs, self.policy.compare.needs_checksum())
            .build(location)
            .context(SnapshotSnafu)
    }

    fn propagate_modified_time(&self, dest: &mut Entry, src: &Entry) {
        match self.fs.set_modified_time(dest.location(), src.modified()) {
            Ok(()) => dest.set_modified(src.modified()),
            Err(error) => warn!(
                "Failed to set the modified time of `{}`: {error}",
                dest.location().best_effort_path_display()
            ),
        }
    }

    fn skip(&mut self, src: &Entry) {
        self.tally.report(SyncEvent::Skipped {
            location: src.location().to_path_buf(),
        });
    }
}

#[derive(Debug, Snafu)]
pub enum SyncError {
    #[snafu(display(
        "Refusing to replace the directory `{}` with the file `{}`, use the --delete argument to allow it",
        destination.best_effort_path_display(),
        source_location.best_effort_path_display()
    ))]
    DirectoryProtectionError {
        destination: PathBuf,
        source_location: PathBuf,
    },
    #[snafu(display("Failed to delete an existing entry"))]
    DeletionError { source: DeletionError },
    #[snafu(display("Failed to create the file `{}`", location.best_effort_path_display()))]
    CreateFileError {
        location: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to create the directory `{}`", location.best_effort_path_display()))]
    CreateDirectoryError {
        location: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to retrieve information about a newly created entry"))]
    SnapshotError { source: SnapshotError },
    #[snafu(display(
        "Failed to copy `{}` to `{}`",
        source_location.best_effort_path_display(),
        destination.best_effort_path_display()
    ))]
    TransferError {
        destination: PathBuf,
        source_location: PathBuf,
        source: std::io::Error,
    },
}
