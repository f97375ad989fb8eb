use std::path::PathBuf;

use colored::Colorize;
use derive_more::Display;
use supports_color::Stream;

/// Something the synchronizer did, or decided not to do, to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SyncEvent {
    /// A file's contents were transferred.
    #[display("{path}")]
    Updated { path: String, bytes: u64 },
    /// A directory was created, or its modified time differed.
    #[display("{path}/")]
    DirectoryUpdated { path: String },
    #[display("Deleted `{}'.", location.display())]
    Deleted { location: PathBuf },
    #[display("Skipping non-regular file `{}'.", location.display())]
    Skipped { location: PathBuf },
}

pub trait Reporter {
    fn report(&mut self, event: SyncEvent);
}

/// Totals of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub files_transferred: usize,
    pub bytes_transferred: u64,
    pub directories_updated: usize,
    pub entries_deleted: usize,
    pub entries_skipped: usize,
}

impl SyncStats {
    fn record(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Updated { bytes, .. } => {
                self.files_transferred += 1;
                self.bytes_transferred += bytes;
            }
            SyncEvent::DirectoryUpdated { .. } => self.directories_updated += 1,
            SyncEvent::Deleted { .. } => self.entries_deleted += 1,
            SyncEvent::Skipped { .. } => self.entries_skipped += 1,
        }
    }
}

/// Counts events on their way to another reporter.
pub(crate) struct Tally<'r> {
    inner: &'r mut dyn Reporter,
    stats: SyncStats,
}

impl<'r> Tally<'r> {
    pub(crate) fn new(inner: &'r mut dyn Reporter) -> Self {
        Self {
            inner,
            stats: SyncStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> SyncStats {
        self.stats
    }
}

impl Reporter for Tally<'_> {
    fn report(&mut self, event: SyncEvent) {
        self.stats.record(&event);
        self.inner.report(event);
    }
}

/// Prints one line per event to stdout, coloured when the terminal allows it.
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        if supports_color::on(Stream::Stdout).is_none() {
            colored::control::set_override(false);
        }
        Self
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn report(&mut self, event: SyncEvent) {
        let line = event.to_string();
        match event {
            SyncEvent::Updated { .. } => println!("{line}"),
            SyncEvent::DirectoryUpdated { .. } => println!("{}", line.bold()),
            SyncEvent::Deleted { .. } => println!("{}", line.red()),
            SyncEvent::Skipped { .. } => println!("{}", line.yellow()),
        }
    }
}
