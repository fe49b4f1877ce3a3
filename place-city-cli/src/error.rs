//! Error types emitted by the Place City CLI.
//!
//! Keep this error type reasonably small, as most CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use place_city_core::ApplyError;
use thiserror::Error;

/// Errors emitted by the Place City CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Argument name.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Argument name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Argument name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Argument name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// IO failure.
        #[source]
        source: std::io::Error,
    },
    /// `--recent` points past the end of the recents list.
    #[error("no recent city #{index} ({available} remembered)")]
    UnknownRecent {
        /// Requested 1-based position.
        index: usize,
        /// Entries in the recents list.
        available: usize,
    },
    /// Reading the host snapshot failed.
    #[error("failed to read snapshot at {path:?}: {source}")]
    ReadSnapshot {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The host snapshot is not valid JSON for a map snapshot.
    #[error("failed to parse snapshot JSON at {path:?}: {source}")]
    ParseSnapshot {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the edited snapshot failed.
    #[error("failed to write edited snapshot to {path:?}: {source}")]
    WriteSnapshot {
        /// Output path.
        path: Utf8PathBuf,
        /// IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    Serialise(#[source] serde_json::Error),
    /// The apply invocation was rejected.
    #[error(transparent)]
    Apply(#[from] ApplyError),
    /// Writing to stdout failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
