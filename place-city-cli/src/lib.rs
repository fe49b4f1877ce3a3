//! Command-line interface for moving venues in a map snapshot.
//!
//! The CLI stands in for the map editor: it loads a JSON snapshot of the
//! editor's data, runs the engine against it, and writes the edited
//! snapshot only when `--output` is given.
#![forbid(unsafe_code)]

use std::env;
use std::io::Write;

use clap::{Parser, Subcommand};
use env_logger::Builder as LogBuilder;
use log::LevelFilter;

mod apply;
mod error;
mod inspect;
mod snapshot;
mod store;

pub use error::CliError;
pub use store::JsonFileKeyValueStore;

use apply::{ApplyArgs, run_apply_with};
use inspect::{RecentsArgs, SelectionArgs, run_recents_with, run_selection_with};

pub(crate) const ARG_SNAPSHOT: &str = "snapshot";
pub(crate) const ARG_CITY: &str = "city";
pub(crate) const ARG_STATE: &str = "state";
pub(crate) const ARG_VENUE: &str = "venue";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_RECENT: &str = "recent";
pub(crate) const ARG_RECENTS: &str = "recents";
pub(crate) const ARG_CITY_MATCH: &str = "city-match";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ENV_APPLY_SNAPSHOT: &str = "PLACE_CITY_CMDS_APPLY_SNAPSHOT";
pub(crate) const ENV_APPLY_CITY: &str = "PLACE_CITY_CMDS_APPLY_CITY";
pub(crate) const ENV_SELECTION_SNAPSHOT: &str = "PLACE_CITY_CMDS_SELECTION_SNAPSHOT";

/// Recents file used when `--recents` is not given.
pub const DEFAULT_RECENTS_PATH: &str = "place-city-recents.json";

/// Run the Place City CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, files, or the apply
/// invocation fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Apply(args) => run_apply_with(args, writer),
        Command::Selection(args) => run_selection_with(args, writer),
        Command::Recents(args) => run_recents_with(args, writer),
    }
}

/// Install `env_logger`. The engine's report mirror stays quiet unless
/// `verbose` is set, because the CLI prints the report itself.
fn init_logging(verbose: bool) {
    let mut builder = LogBuilder::new();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else {
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("place_city", LevelFilter::Off)
            .filter_module("place_city_core", LevelFilter::Warn)
            .filter_module("place_city_cli", LevelFilter::Warn);
    }
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        log::debug!("logger already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "place-city",
    about = "Move selected venues into another city, keeping their streets",
    version
)]
struct Cli {
    /// Show debug output, including empty-street strategy attempts.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Move the selected venues of a snapshot into a city.
    Apply(ApplyArgs),
    /// Report which venues a snapshot has selected.
    Selection(SelectionArgs),
    /// List recently used destination cities.
    Recents(RecentsArgs),
}

#[cfg(test)]
mod tests;
