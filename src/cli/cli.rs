use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;
use crate::sync::CompareMode;

/// Makes a destination file or directory tree match a source one.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// File or directory to copy from
    pub source: PathBuf,
    /// File or directory to bring in line with the source
    pub destination: PathBuf,

    /// Consider files different only when their sizes differ
    #[clap(long, short)]
    pub size_only: bool,
    /// Consider files different only when their SHA-256 digests differ
    #[clap(long, short)]
    pub checksum: bool,
    /// Delete destination entries missing from the source, and allow files to
    /// replace directories
    #[clap(long, short)]
    pub delete: bool,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
    /// YAML file with default comparison and deletion settings
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// Print both snapshots and exit without synchronizing
    #[clap(long)]
    pub list: bool,
}

impl Cli {
    /// The comparison asked for on the command line, if any. `--checksum`
    /// takes precedence over `--size-only`.
    pub fn compare_mode(&self) -> Option<CompareMode> {
        if self.checksum {
            Some(CompareMode::ChecksumOnly)
        } else if self.size_only {
            Some(CompareMode::SizeOnly)
        } else {
            None
        }
    }
}
