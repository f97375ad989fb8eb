use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use snafu::{OptionExt, ResultExt, Snafu};
use tracing::debug;

use crate::checksum::{Checksum, ChecksumError};
use crate::ext::BestEffortPathExt;
use crate::filesystem::{FileKind, Filesystem, Metadata};
use crate::snapshot::{Entry, EntryKind};

/// Builds snapshot trees by walking a [`Filesystem`] top-down.
///
/// The walk never follows symlinks and stops at the first error; a partially
/// built tree is never returned.
pub struct SnapshotBuilder<'fs> {
    fs: &'fs dyn Filesystem,
    want_checksum: bool,
}

impl<'fs> SnapshotBuilder<'fs> {
    pub fn new(fs: &'fs dyn Filesystem, want_checksum: bool) -> Self {
        Self { fs, want_checksum }
    }

    pub fn build(&self, location: &Path) -> Result<Entry, SnapshotError> {
        let metadata = self.fs.metadata(location).context(MetadataSnafu { location })?;
        self.build_entry(location.to_path_buf(), metadata)
    }

    fn build_entry(&self, location: PathBuf, metadata: Metadata) -> Result<Entry, SnapshotError> {
        debug!("Examining {}", location.best_effort_path_display());

        let name = metadata.name.context(InfoRetrievalSnafu {
            location: &location,
            attribute: "Filename",
        })?;
        let display_name = metadata.display_name.context(InfoRetrievalSnafu {
            location: &location,
            attribute: "Displayable filename",
        })?;

        let kind = match metadata.kind {
            FileKind::File => EntryKind::File {
                size: metadata.size,
                checksum: self.checksum_if_wanted(&location)?,
            },
            FileKind::Directory => EntryKind::Directory {
                children: self.build_children(&location)?,
            },
            FileKind::Other => EntryKind::Other,
        };

        Ok(Entry::new(
            name,
            display_name,
            metadata.modified,
            location,
            kind,
        ))
    }

    fn checksum_if_wanted(&self, location: &Path) -> Result<Option<Checksum>, SnapshotError> {
        if !self.want_checksum {
            return Ok(None);
        }
        Checksum::for_location(self.fs, location)
            .map(Some)
            .context(ChecksumSnafu { location })
    }

    fn build_children(&self, location: &Path) -> Result<HashMap<OsString, Entry>, SnapshotError> {
        let listing = self
            .fs
            .read_children(location)
            .context(EnumerationSnafu { location })?;

        let mut children = HashMap::with_capacity(listing.len());
        for metadata in listing {
            let name = metadata.name.clone().context(InfoRetrievalSnafu {
                location,
                attribute: "Filename of a child",
            })?;
            let child_location = self.fs.child_location(location, &name);
            let child = self
                .build_entry(child_location, metadata)
                .map_err(Box::new)
                .context(ChildSnafu { location })?;
            children.insert(name, child);
        }

        Ok(children)
    }
}

#[derive(Debug, Snafu)]
pub enum SnapshotError {
    #[snafu(display("Failed to retrieve information about `{}`", location.best_effort_path_display()))]
    MetadataError {
        location: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "Failed to retrieve information about `{}`: {} information missing",
        location.best_effort_path_display(),
        attribute
    ))]
    InfoRetrievalError {
        location: PathBuf,
        attribute: &'static str,
    },
    #[snafu(display(
        "Failed to retrieve information about the children of the directory `{}`",
        location.best_effort_path_display()
    ))]
    EnumerationError {
        location: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to produce a checksum for the file `{}`", location.best_effort_path_display()))]
    ChecksumError {
        location: PathBuf,
        source: ChecksumError,
    },
    #[snafu(display(
        "Failed to retrieve information about a child of the directory `{}`",
        location.best_effort_path_display()
    ))]
    ChildError {
        location: PathBuf,
        source: Box<SnapshotError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::LocalFilesystem;
    use crate::sync::test_support::{FaultyFilesystem, Operation};
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("top.txt"), "top").expect("Failed to write file");
        fs::create_dir_all(temp_dir.path().join("nested/deeper")).expect("Failed to create dirs");
        fs::write(temp_dir.path().join("nested/inner.txt"), "inner!").expect("Failed to write");
        fs::write(temp_dir.path().join("nested/deeper/leaf"), "").expect("Failed to write");
        temp_dir
    }

    #[test]
    fn build_mirrors_directory_structure() {
        let temp_dir = sample_tree();

        let root = SnapshotBuilder::new(&LocalFilesystem, false)
            .build(temp_dir.path())
            .expect("Failed to build snapshot");

        assert!(root.is_directory());
        assert_eq!(root.children().map(HashMap::len), Some(2));
        let nested = root.child("nested").expect("nested missing");
        assert!(nested.is_directory());
        assert!(matches!(
            nested.child("inner.txt").map(Entry::kind),
            Some(EntryKind::File {
                size: 6,
                checksum: None
            })
        ));
        let leaf = nested
            .child("deeper")
            .and_then(|deeper| deeper.child("leaf"))
            .expect("leaf missing");
        assert_eq!(leaf.location(), temp_dir.path().join("nested/deeper/leaf"));
    }

    #[test]
    fn build_records_checksums_when_requested() {
        let temp_dir = sample_tree();

        let root = SnapshotBuilder::new(&LocalFilesystem, true)
            .build(temp_dir.path())
            .expect("Failed to build snapshot");

        let expected = Checksum::for_location(&LocalFilesystem, &temp_dir.path().join("top.txt"))
            .expect("Failed to checksum file");
        assert!(matches!(
            root.child("top.txt").map(Entry::kind),
            Some(EntryKind::File { checksum: Some(checksum), .. }) if *checksum == expected
        ));
    }

    #[test]
    fn build_single_file() {
        let temp_dir = sample_tree();
        let path = temp_dir.path().join("top.txt");

        let entry = SnapshotBuilder::new(&LocalFilesystem, false)
            .build(&path)
            .expect("Failed to build snapshot");

        assert!(entry.is_file());
        assert_eq!(entry.display_name(), "top.txt");
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let temp_dir = sample_tree();
        std::os::unix::fs::symlink(temp_dir.path().join("nested"), temp_dir.path().join("alias"))
            .expect("Failed to create symlink");

        let root = SnapshotBuilder::new(&LocalFilesystem, false)
            .build(temp_dir.path())
            .expect("Failed to build snapshot");

        let alias = root.child("alias").expect("alias missing");
        assert_eq!(alias.kind(), &EntryKind::Other);
    }

    #[test]
    fn build_fails_on_missing_location() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("missing");

        let result = SnapshotBuilder::new(&LocalFilesystem, false).build(&missing);

        assert!(matches!(
            result,
            Err(SnapshotError::MetadataError { location, .. }) if location == missing
        ));
    }

    #[test]
    fn enumeration_failure_of_a_child_is_wrapped_with_parent_location() {
        let temp_dir = sample_tree();
        let nested = temp_dir.path().join("nested");
        let fs = FaultyFilesystem::new(Operation::ReadChildren, &nested);

        let result = SnapshotBuilder::new(&fs, false).build(temp_dir.path());

        match result {
            Err(SnapshotError::ChildError { location, source }) => {
                assert_eq!(location, temp_dir.path());
                assert!(matches!(
                    *source,
                    SnapshotError::EnumerationError { ref location, .. } if *location == nested
                ));
            }
            other => panic!("Expected ChildError, got {other:?}"),
        }
    }

    #[test]
    fn checksum_failure_aborts_the_snapshot() {
        let temp_dir = sample_tree();
        let fs = FaultyFilesystem::new(Operation::OpenRead, &temp_dir.path().join("top.txt"));

        let result = SnapshotBuilder::new(&fs, true).build(temp_dir.path());

        assert!(matches!(
            result,
            Err(SnapshotError::ChildError { ref source, .. })
                if matches!(**source, SnapshotError::ChecksumError { .. })
        ));
    }

    #[test]
    fn missing_display_name_is_info_retrieval_error() {
        let temp_dir = sample_tree();
        let fs = FaultyFilesystem::without_display_names();

        let result = SnapshotBuilder::new(&fs, false).build(temp_dir.path());

        match result {
            Err(SnapshotError::InfoRetrievalError { location, attribute }) => {
                assert_eq!(location, temp_dir.path());
                assert_eq!(attribute, "Displayable filename");
            }
            other => panic!("Expected InfoRetrievalError, got {other:?}"),
        }
    }

    #[test]
    fn info_retrieval_error_display() {
        let error = SnapshotError::InfoRetrievalError {
            location: PathBuf::from("/srv/share/x"),
            attribute: "Filename",
        };

        assert_eq!(
            error.to_string(),
            "Failed to retrieve information about `/srv/share/x`: Filename information missing"
        );
    }
}
