//! Reconciliation of a destination tree against a source tree.

mod deletion;
mod policy;
mod report;
mod synchronizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use policy::{CompareMode, SyncPolicy};
pub use report::{ConsoleReporter, Reporter, SyncEvent, SyncStats};
pub use synchronizer::{SyncError, Synchronizer};
