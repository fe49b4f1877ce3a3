//! Most-recently-used destination cities.
//!
//! The list is a convenience for the operator and never affects
//! reassignment. It is persisted as a JSON array under [`RECENTS_KEY`] in a
//! [`KeyValueStore`]; unreadable data degrades to an empty list.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of remembered destinations.
pub const MAX_RECENTS: usize = 8;

/// Key the list is stored under.
pub const RECENTS_KEY: &str = "place_city.recents";

/// A previously used destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentCity {
    /// City name as entered.
    pub city: String,
    /// Resolved state name, empty when none was used.
    #[serde(default)]
    pub state: String,
}

impl RecentCity {
    /// Create an entry.
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// Label shown to the operator, e.g. `Springfield (Illinois)`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.state.is_empty() {
            self.city.clone()
        } else {
            format!("{} ({})", self.city, self.state)
        }
    }
}

/// Newest-first list capped at [`MAX_RECENTS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentCities(Vec<RecentCity>);

impl RecentCities {
    /// Entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[RecentCity] {
        &self.0
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Put `entry` at the front, dropping an equal `(city, state)` pair and
    /// evicting the oldest entry past the cap.
    ///
    /// # Examples
    /// ```
    /// use place_city_core::{RecentCities, RecentCity};
    ///
    /// let mut recents = RecentCities::default();
    /// recents.push(RecentCity::new("Springfield", ""));
    /// recents.push(RecentCity::new("Shelbyville", ""));
    /// recents.push(RecentCity::new("Springfield", ""));
    /// assert_eq!(recents.len(), 2);
    /// assert_eq!(recents.entries()[0].city, "Springfield");
    /// ```
    pub fn push(&mut self, entry: RecentCity) {
        self.0.retain(|existing| existing != &entry);
        self.0.insert(0, entry);
        self.0.truncate(MAX_RECENTS);
    }
}

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum RecentsError {
    /// Reading from the store failed.
    #[error("failed to read {key}: {message}")]
    Read {
        /// Key being read.
        key: String,
        /// Backend message.
        message: String,
    },
    /// Writing to the store failed.
    #[error("failed to write {key}: {message}")]
    Write {
        /// Key being written.
        key: String,
        /// Backend message.
        message: String,
    },
    /// Serialising the list failed.
    #[error("failed to serialise recent cities")]
    Serialise(#[source] serde_json::Error),
}

/// Minimal persistent string store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns [`RecentsError::Read`] when the backend fails.
    fn get(&self, key: &str) -> Result<Option<String>, RecentsError>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    /// Returns [`RecentsError::Write`] when the backend fails.
    fn put(&mut self, key: &str, value: String) -> Result<(), RecentsError>;
}

/// Process-local [`KeyValueStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryKeyValueStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RecentsError> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), RecentsError> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Loads and updates the recents list in a [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct RecentsStore<S> {
    store: S,
}

impl<S: KeyValueStore> RecentsStore<S> {
    /// Wrap a backing store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Current list. Missing or corrupt data yields an empty list.
    pub fn load(&self) -> RecentCities {
        let raw = match self.store.get(RECENTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RecentCities::default(),
            Err(err) => {
                warn!("recent cities unavailable: {err}");
                return RecentCities::default();
            }
        };
        serde_json::from_str::<RecentCities>(&raw)
            .map(|mut recents| {
                recents.0.truncate(MAX_RECENTS);
                recents
            })
            .unwrap_or_else(|err| {
                warn!("discarding corrupt recent cities: {err}");
                RecentCities::default()
            })
    }

    /// Record `entry` as the most recent destination and return the new list.
    ///
    /// # Errors
    /// Returns [`RecentsError`] when the updated list cannot be written.
    pub fn remember(&mut self, entry: RecentCity) -> Result<RecentCities, RecentsError> {
        let mut recents = self.load();
        recents.push(entry);
        let raw = serde_json::to_string(&recents).map_err(RecentsError::Serialise)?;
        self.store.put(RECENTS_KEY, raw)?;
        Ok(recents)
    }
}
