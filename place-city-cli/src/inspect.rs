//! Read-only `selection` and `recents` commands.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use place_city_core::{RecentsStore, SelectionStatus, resolve_selection};
use serde::{Deserialize, Serialize};

use crate::snapshot::{load_snapshot, require_existing};
use crate::store::JsonFileKeyValueStore;
use crate::{ARG_RECENTS, ARG_SNAPSHOT, CliError, DEFAULT_RECENTS_PATH, ENV_SELECTION_SNAPSHOT};

/// CLI arguments for the `selection` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Show the selected venues of a snapshot")]
#[ortho_config(prefix = "PLACE_CITY")]
pub(crate) struct SelectionArgs {
    /// Path to the JSON map snapshot.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
}

/// CLI arguments for the `recents` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List recently used destination cities, newest first")]
#[ortho_config(prefix = "PLACE_CITY")]
pub(crate) struct RecentsArgs {
    /// Recents file (defaults to `place-city-recents.json`).
    #[arg(long = ARG_RECENTS, value_name = "path")]
    #[serde(default)]
    pub(crate) recents: Option<Utf8PathBuf>,
}

pub(crate) fn run_selection_with(
    args: SelectionArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let snapshot = merged.snapshot.ok_or(CliError::MissingArgument {
        field: ARG_SNAPSHOT,
        env: ENV_SELECTION_SNAPSHOT,
    })?;
    require_existing(&snapshot, ARG_SNAPSHOT)?;
    let host = load_snapshot(&snapshot)?;
    let venues = resolve_selection(&host);
    writeln!(writer, "{}", SelectionStatus::from_ids(&venues)).map_err(CliError::WriteOutput)?;
    for venue in &venues {
        writeln!(writer, "  {venue}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

pub(crate) fn run_recents_with(args: RecentsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let path = merged
        .recents
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_RECENTS_PATH));
    let recents = RecentsStore::new(JsonFileKeyValueStore::new(path)).load();
    if recents.is_empty() {
        writeln!(writer, "No recent cities.").map_err(CliError::WriteOutput)?;
    }
    for (position, entry) in recents.entries().iter().enumerate() {
        writeln!(writer, "{}. {}", position + 1, entry.label()).map_err(CliError::WriteOutput)?;
    }
    Ok(())
}
