use std::path::PathBuf;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::Cli;
use crate::config::{Config, ConfigError};
use crate::ext::BestEffortPathExt;
use crate::filesystem::LocalFilesystem;
use crate::snapshot::{SnapshotBuilder, SnapshotError};
use crate::sync::{ConsoleReporter, SyncError, Synchronizer};

pub struct Application;

impl Application {
    pub fn run(cli: Cli) -> Result<(), ApplicationError> {
        let config = match &cli.config {
            Some(path) => Config::from_path(path).context(ConfigSnafu)?,
            None => Config::default(),
        };
        debug!("Loaded config: {:?}", config);

        let runtime_config = RuntimeConfig::merge(cli, config);
        debug!("Runtime config: {:?}", runtime_config);

        let source = LocalFilesystem::resolve(&runtime_config.source).context(LocationSnafu {
            path: &runtime_config.source,
        })?;
        let destination =
            LocalFilesystem::resolve(&runtime_config.destination).context(LocationSnafu {
                path: &runtime_config.destination,
            })?;

        let fs = LocalFilesystem;
        let builder = SnapshotBuilder::new(&fs, runtime_config.policy.compare.needs_checksum());
        info!("Examining {}", source.best_effort_path_display());
        let source_tree = builder.build(&source).context(SourceSnapshotSnafu)?;
        info!("Examining {}", destination.best_effort_path_display());
        let mut destination_tree = builder
            .build(&destination)
            .context(DestinationSnapshotSnafu)?;

        if runtime_config.list {
            print!("{}", source_tree.listing());
            print!("{}", destination_tree.listing());
            return Ok(());
        }

        let mut reporter = ConsoleReporter::new();
        let stats = Synchronizer::new(&fs, runtime_config.policy, &mut reporter)
            .synchronize(&mut destination_tree, &source_tree)
            .context(SynchronizationSnafu)?;
        info!(
            "Transferred {} files ({} bytes), updated {} directories, deleted {} entries, skipped {} entries",
            stats.files_transferred,
            stats.bytes_transferred,
            stats.directories_updated,
            stats.entries_deleted,
            stats.entries_skipped
        );

        Ok(())
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Invalid command-line arguments"), visibility(pub(crate)))]
    ArgumentError { source: clap::Error },
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Failed to resolve the path `{}`", path.best_effort_path_display()))]
    LocationError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to take a snapshot of the source"))]
    SourceSnapshotError { source: SnapshotError },
    #[snafu(display("Failed to take a snapshot of the destination"))]
    DestinationSnapshotError { source: SnapshotError },
    #[snafu(display("Synchronization failed"))]
    SynchronizationError { source: SyncError },
}
