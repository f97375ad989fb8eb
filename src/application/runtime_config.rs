use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::Config;
use crate::sync::SyncPolicy;

/// Everything one run needs, after the command line has been merged over the
/// config file.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub policy: SyncPolicy,
    pub list: bool,
}

impl RuntimeConfig {
    pub fn merge(cli: Cli, config: Config) -> Self {
        let defaults = SyncPolicy::default();
        let policy = SyncPolicy {
            compare: cli
                .compare_mode()
                .or(config.compare)
                .unwrap_or(defaults.compare),
            delete_unwanted: cli.delete || config.delete.unwrap_or(defaults.delete_unwanted),
        };

        Self {
            source: cli.source,
            destination: cli.destination,
            policy,
            list: cli.list,
        }
    }
}
