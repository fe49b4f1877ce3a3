//! Apply command implementation for the Place City CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use place_city_core::{
    ApplyReport, ApplyRequest, CityNameMatch, PlaceCity, RecentCities, RecentsStore,
    SelectionStatus, VenueId, resolve_selection,
};
use serde::{Deserialize, Serialize};

use crate::snapshot::{load_snapshot, require_existing, save_snapshot};
use crate::store::JsonFileKeyValueStore;
use crate::{
    ARG_CITY, ARG_CITY_MATCH, ARG_FORMAT, ARG_OUTPUT, ARG_RECENT, ARG_RECENTS, ARG_SNAPSHOT,
    ARG_STATE, ARG_VENUE, CliError, DEFAULT_RECENTS_PATH, ENV_APPLY_CITY, ENV_APPLY_SNAPSHOT,
};

/// How "already in the target city" compares city names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum CityMatchArg {
    /// Trimmed, case-insensitive comparison.
    #[default]
    CaseInsensitive,
    /// Also ignore accents and punctuation.
    Folded,
}

impl From<CityMatchArg> for CityNameMatch {
    fn from(arg: CityMatchArg) -> Self {
        match arg {
            CityMatchArg::CaseInsensitive => Self::CaseInsensitive,
            CityMatchArg::Folded => Self::Folded,
        }
    }
}

/// Shape of the apply report on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum OutputFormat {
    /// One log line per entry.
    #[default]
    Text,
    /// The full report as JSON.
    Json,
}

/// CLI arguments for the `apply` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Move venues from a JSON map snapshot into a city. Venues \
                 keep their street name and house number; venues without a \
                 street are linked to the city's empty street. The edited \
                 snapshot is only written when --output is given.",
    about = "Move venues into a city"
)]
#[ortho_config(prefix = "PLACE_CITY")]
pub(crate) struct ApplyArgs {
    /// Path to the JSON map snapshot.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) snapshot: Option<Utf8PathBuf>,
    /// Destination city name.
    #[arg(long = ARG_CITY, value_name = "name")]
    #[serde(default)]
    pub(crate) city: Option<String>,
    /// State used to disambiguate the city.
    #[arg(long = ARG_STATE, value_name = "name")]
    #[serde(default)]
    pub(crate) state: Option<String>,
    /// Reuse a recent destination, 1 being the newest.
    #[arg(
        long = ARG_RECENT,
        value_name = "n",
        conflicts_with_all = [ARG_CITY, ARG_STATE]
    )]
    #[serde(default)]
    pub(crate) recent: Option<usize>,
    /// Venue to move; repeat for several. Defaults to the snapshot selection.
    #[arg(long = ARG_VENUE, value_name = "id")]
    #[serde(default)]
    pub(crate) venue: Option<Vec<String>>,
    /// Where to write the edited snapshot.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Recents file (defaults to `place-city-recents.json`).
    #[arg(long = ARG_RECENTS, value_name = "path")]
    #[serde(default)]
    pub(crate) recents: Option<Utf8PathBuf>,
    /// City name comparison for venues already in place.
    #[arg(long = ARG_CITY_MATCH, value_enum)]
    #[serde(default)]
    pub(crate) city_match: Option<CityMatchArg>,
    /// Report format.
    #[arg(long = ARG_FORMAT, value_enum)]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl ApplyArgs {
    pub(crate) fn into_config(self) -> Result<ApplyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ApplyConfig::try_from(merged)
    }
}

/// Where the venues go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApplyTarget {
    /// City and state given by name.
    Named(ApplyRequest),
    /// 1-based position in the recents list, newest first.
    Recent(usize),
}

impl ApplyTarget {
    /// The request this target stands for, looking recent entries up in
    /// `recents`.
    pub(crate) fn request(&self, recents: &RecentCities) -> Result<ApplyRequest, CliError> {
        match self {
            Self::Named(request) => Ok(request.clone()),
            Self::Recent(index) => {
                let entry = index
                    .checked_sub(1)
                    .and_then(|position| recents.entries().get(position))
                    .ok_or(CliError::UnknownRecent {
                        index: *index,
                        available: recents.len(),
                    })?;
                Ok(ApplyRequest {
                    city: entry.city.clone(),
                    state: Some(entry.state.clone()).filter(|state| !state.is_empty()),
                })
            }
        }
    }
}

/// Resolved `apply` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApplyConfig {
    /// Input snapshot.
    pub(crate) snapshot: Utf8PathBuf,
    /// Destination city.
    pub(crate) target: ApplyTarget,
    /// Explicit venues; `None` means use the snapshot selection.
    pub(crate) venues: Option<Vec<VenueId>>,
    /// Edited snapshot destination.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Recents file.
    pub(crate) recents: Utf8PathBuf,
    /// Already-in-place comparison.
    pub(crate) city_match: CityNameMatch,
    /// Report format.
    pub(crate) format: OutputFormat,
}

impl TryFrom<ApplyArgs> for ApplyConfig {
    type Error = CliError;

    fn try_from(args: ApplyArgs) -> Result<Self, Self::Error> {
        let snapshot = args.snapshot.ok_or(CliError::MissingArgument {
            field: ARG_SNAPSHOT,
            env: ENV_APPLY_SNAPSHOT,
        })?;
        let target = match args.recent {
            Some(index) => ApplyTarget::Recent(index),
            None => ApplyTarget::Named(ApplyRequest {
                city: args.city.ok_or(CliError::MissingArgument {
                    field: ARG_CITY,
                    env: ENV_APPLY_CITY,
                })?,
                state: args.state.filter(|state| !state.trim().is_empty()),
            }),
        };
        let venues = args
            .venue
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.into_iter().map(VenueId::from).collect());
        Ok(Self {
            snapshot,
            target,
            venues,
            output: args.output,
            recents: args
                .recents
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_RECENTS_PATH)),
            city_match: args.city_match.unwrap_or_default().into(),
            format: args.format.unwrap_or_default(),
        })
    }
}

pub(crate) fn run_apply_with(args: ApplyArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.snapshot, ARG_SNAPSHOT)?;
    let report = execute_apply(&config)?;
    match config.format {
        OutputFormat::Text => write_text_report(writer, &report, config.output.is_some()),
        OutputFormat::Json => write_json_report(writer, &report),
    }
}

fn execute_apply(config: &ApplyConfig) -> Result<ApplyReport, CliError> {
    let mut host = load_snapshot(&config.snapshot)?;
    let venues = config
        .venues
        .clone()
        .unwrap_or_else(|| resolve_selection(&host));
    log::info!("{}", SelectionStatus::from_ids(&venues));

    let recents = RecentsStore::new(JsonFileKeyValueStore::new(config.recents.clone()));
    let request = config.target.request(&recents.load())?;
    let engine = PlaceCity::with_recents(recents).city_match(config.city_match);
    let report = engine.apply(&mut host, &request, &venues)?;

    if let Some(output) = &config.output {
        save_snapshot(output, &host)?;
    }
    Ok(report)
}

fn write_text_report(
    writer: &mut dyn Write,
    report: &ApplyReport,
    saved: bool,
) -> Result<(), CliError> {
    for line in report.log.lines() {
        writeln!(writer, "{line}").map_err(CliError::WriteOutput)?;
    }
    if !saved {
        writeln!(writer, "(dry run: pass --{ARG_OUTPUT} to write the edited snapshot)")
            .map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

fn write_json_report(writer: &mut dyn Write, report: &ApplyReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::Serialise)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ApplyConfig, CliError> {
    let merged = ApplyArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ApplyConfig::try_from(merged)
}
