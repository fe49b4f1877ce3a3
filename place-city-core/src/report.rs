//! Structured log entries and outcome counts produced by an apply run.
//!
//! Every entry is also forwarded to the `log` facade so terminal and test
//! consumers see the same stream.

use std::fmt;

use log::Level;
use serde::{Deserialize, Serialize};

use crate::model::VenueId;

const LOG_TARGET: &str = "place_city";

/// Severity of an [`ApplyLog`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal progress.
    Info,
    /// Degraded but non-fatal outcome.
    Warn,
    /// A failure.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// One line of operator-facing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// Venue the entry concerns, if any.
    pub venue: Option<VenueId>,
    /// Rendered message.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.venue {
            Some(venue) => write!(f, "• Venue {venue}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Append-only log of an apply invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyLog {
    entries: Vec<LogEntry>,
}

impl ApplyLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry not tied to a venue.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        self.record(LogEntry {
            level,
            venue: None,
            message: message.into(),
        });
    }

    /// Append an entry about a specific venue.
    pub fn venue(&mut self, level: LogLevel, venue: &VenueId, message: impl Into<String>) {
        self.record(LogEntry {
            level,
            venue: Some(venue.clone()),
            message: message.into(),
        });
    }

    /// Shorthand for an info entry.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    /// Shorthand for a warning entry.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    fn record(&mut self, entry: LogEntry) {
        log::log!(target: LOG_TARGET, Level::from(entry.level), "{entry}");
        self.entries.push(entry);
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Rendered lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.entries.iter().map(ToString::to_string)
    }

    /// Entries concerning `venue`.
    pub fn for_venue<'a>(&'a self, venue: &'a VenueId) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.venue.as_ref() == Some(venue))
    }

    /// Whether any entry message contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.message.contains(needle))
    }
}

/// Per-invocation outcome counts.
///
/// `already_there` is informational: those venues count as neither changed,
/// skipped, nor errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    /// Venues whose address was updated.
    pub changed: usize,
    /// No-street venues left alone because no empty street was available.
    pub skipped: usize,
    /// Venues whose processing failed.
    pub errors: usize,
    /// Venues already recorded in the target city.
    pub already_there: usize,
}

impl OutcomeTally {
    /// Final summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Done. Changed: {} • Skipped: {} • Errors: {}",
            self.changed, self.skipped, self.errors
        )
    }
}
