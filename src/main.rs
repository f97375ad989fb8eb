#![allow(clippy::enum_variant_names)]
#![allow(clippy::module_inception)]

use clap::Parser as _;
use snafu::ResultExt;
use tracing::debug;

use crate::{
    application::{Application, ApplicationError, ArgumentSnafu},
    cli::Cli,
};

mod application;
mod checksum;
mod cli;
mod config;
mod ext;
mod filesystem;
mod snapshot;
mod sync;

#[snafu::report]
fn main() -> Result<(), ApplicationError> {
    let cli_args = match Cli::try_parse() {
        Ok(cli_args) => cli_args,
        // --help and --version
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => return Err(error).context(ArgumentSnafu),
    };
    setup_tracing(&cli_args);
    debug!("Parsed CLI arguments: {cli_args:?}");

    Application::run(cli_args)?;

    Ok(())
}

fn setup_tracing(cli_args: &Cli) {
    if let Some(level) = cli_args.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .without_time()
            .compact()
            .init();
    }
}
