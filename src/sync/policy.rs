use clap::ValueEnum;
use derive_more::Display;

/// How two files are decided to be different.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
pub enum CompareMode {
    /// Sizes differ. Same-size files with different contents are not copied.
    #[display("size-only")]
    SizeOnly,
    /// Sizes or modified times differ.
    #[default]
    #[display("size-and-time")]
    SizeAndTime,
    /// SHA-256 digests differ. Sizes and times are ignored.
    #[value(name = "checksum")]
    #[display("checksum")]
    ChecksumOnly,
}

impl CompareMode {
    pub fn needs_checksum(self) -> bool {
        self == CompareMode::ChecksumOnly
    }

    pub fn compares_time(self) -> bool {
        self == CompareMode::SizeAndTime
    }
}

/// Read-only settings threaded through one synchronization run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncPolicy {
    pub compare: CompareMode,
    /// Remove destination entries missing from the source, and allow files to
    /// replace directories.
    pub delete_unwanted: bool,
}
