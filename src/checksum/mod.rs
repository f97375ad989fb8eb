mod checksum;

pub use checksum::{Checksum, ChecksumError};
