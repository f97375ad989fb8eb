use std::env;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tempfile::Builder;
use tracing::debug;

use crate::ext::{BestEffortPathExt, absolute_location};
use crate::filesystem::{FileKind, Filesystem, Metadata, TRANSFER_CHUNK_SIZE};

const STAGING_PREFIX: &str = ".treesync-";

/// [`Filesystem`] backed by `std::fs`. Locations are plain paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Resolves a user supplied path into an absolute location, relative to
    /// the current working directory.
    pub fn resolve(path: &Path) -> io::Result<PathBuf> {
        let current_dir = env::current_dir()?;
        Ok(absolute_location(path, &current_dir))
    }

    fn describe(name: Option<OsString>, metadata: &fs::Metadata) -> Metadata {
        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            FileKind::File
        } else if file_type.is_dir() {
            FileKind::Directory
        } else {
            FileKind::Other
        };

        Metadata {
            kind,
            display_name: name.as_ref().map(|n| n.to_string_lossy().into_owned()),
            name,
            size: metadata.len(),
            modified: FileTime::from_last_modification_time(metadata),
        }
    }
}

/// The last component of a location; the filesystem root is called `/`.
fn location_name(location: &Path) -> Option<OsString> {
    match location.file_name() {
        Some(name) => Some(name.to_os_string()),
        None if location.has_root() && location.parent().is_none() => Some(OsString::from("/")),
        None => None,
    }
}

impl Filesystem for LocalFilesystem {
    fn metadata(&self, location: &Path) -> io::Result<Metadata> {
        let metadata = fs::symlink_metadata(location)?;
        Ok(Self::describe(location_name(location), &metadata))
    }

    fn read_children(&self, location: &Path) -> io::Result<Vec<Metadata>> {
        fs::read_dir(location)?
            .map(|entry| {
                let entry = entry?;
                // DirEntry::metadata does not traverse symlinks
                let metadata = entry.metadata()?;
                Ok(Self::describe(Some(entry.file_name()), &metadata))
            })
            .collect()
    }

    fn open_read(&self, location: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(location)?))
    }

    fn create_empty(&self, location: &Path) -> io::Result<()> {
        File::create(location).map(drop)
    }

    fn replace_contents(&self, location: &Path, contents: &mut dyn Read) -> io::Result<u64> {
        let parent = location.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "`{}` has no parent directory",
                    location.best_effort_path_display()
                ),
            )
        })?;

        let mut staging = Builder::new().prefix(STAGING_PREFIX).tempfile_in(parent)?;
        if let Ok(existing) = fs::metadata(location) {
            staging.as_file().set_permissions(existing.permissions())?;
        }

        let mut buffer = vec![0u8; TRANSFER_CHUNK_SIZE];
        let mut copied = 0u64;
        loop {
            let read = match contents.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            staging.write_all(&buffer[..read])?;
            copied += read as u64;
        }
        staging.flush()?;

        debug!(
            "Moving {} staged bytes over {}",
            copied,
            location.best_effort_path_display()
        );
        staging.persist(location).map_err(|error| error.error)?;
        Ok(copied)
    }

    fn remove(&self, location: &Path) -> io::Result<()> {
        if fs::symlink_metadata(location)?.is_dir() {
            fs::remove_dir(location)
        } else {
            fs::remove_file(location)
        }
    }

    fn create_directory(&self, location: &Path) -> io::Result<()> {
        fs::create_dir(location)
    }

    fn set_modified_time(&self, location: &Path, modified: FileTime) -> io::Result<()> {
        filetime::set_file_mtime(location, modified)
    }
}
