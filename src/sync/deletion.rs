use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::ext::BestEffortPathExt;
use crate::filesystem::Filesystem;
use crate::snapshot::{Entry, EntryKind};
use crate::sync::{Reporter, SyncEvent};

/// Deletes an entry and everything beneath it, children first.
///
/// The entry is consumed whatever the outcome. Deletion stops at the first
/// failure; siblings not reached yet are left on disk and children already
/// removed stay removed.
pub fn delete(
    fs: &dyn Filesystem,
    entry: Entry,
    reporter: &mut dyn Reporter,
) -> Result<(), DeletionError> {
    let (location, kind) = entry.into_parts();

    if let EntryKind::Directory { children } = kind {
        for child in children.into_values() {
            delete(fs, child, reporter)?;
        }
    }

    debug!("Removing {}", location.best_effort_path_display());
    fs.remove(&location).context(DeletionSnafu {
        location: &location,
    })?;
    reporter.report(SyncEvent::Deleted { location });
    Ok(())
}

#[derive(Debug, Snafu)]
#[snafu(display("Failed to delete `{}`", location.best_effort_path_display()))]
pub struct DeletionError {
    location: PathBuf,
    source: std::io::Error,
}

impl DeletionError {
    pub fn location(&self) -> &Path {
        &self.location
    }
}
