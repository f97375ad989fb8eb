use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use snafu::{ResultExt, Snafu};

use crate::ext::BestEffortPathExt;
use crate::filesystem::{Filesystem, TRANSFER_CHUNK_SIZE};

pub const CHECKSUM_SIZE: usize = 32;

/// SHA-256 digest of a file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Checksum([u8; CHECKSUM_SIZE]);

impl Checksum {
    /// Digests everything readable from `reader`, consuming it in fixed-size
    /// chunks so that large files are never held in memory.
    pub fn from_reader(reader: &mut dyn Read) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; TRANSFER_CHUNK_SIZE];

        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            };
            hasher.update(&buffer[..read]);
        }

        Ok(Checksum(hasher.finalize().into()))
    }

    pub fn for_location(fs: &dyn Filesystem, location: &Path) -> Result<Self, ChecksumError> {
        let mut reader = fs.open_read(location).context(OpenSnafu { location })?;
        Self::from_reader(&mut reader).context(ReadSnafu { location })
    }

    pub fn as_bytes(&self) -> &[u8; CHECKSUM_SIZE] {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:")?;
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

#[derive(Debug, Snafu)]
pub enum ChecksumError {
    #[snafu(display("Failed to open `{}` for checksumming", location.best_effort_path_display()))]
    OpenError {
        location: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read `{}` while checksumming", location.best_effort_path_display()))]
    ReadError {
        location: PathBuf,
        source: std::io::Error,
    },
}
