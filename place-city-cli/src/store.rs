//! File-backed [`KeyValueStore`] for the recents list.

use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use log::warn;
use place_city_core::{KeyValueStore, RecentsError};

/// Key-value pairs kept as one JSON object in a UTF-8 file.
///
/// A missing file reads as empty. Writes rewrite the whole file and create
/// its parent directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileKeyValueStore {
    path: Utf8PathBuf,
}

impl JsonFileKeyValueStore {
    /// Store backed by `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self, key: &str) -> Result<BTreeMap<String, String>, RecentsError> {
        let raw = place_city_fs::read_optional_utf8(&self.path).map_err(|err| {
            RecentsError::Read {
                key: key.to_owned(),
                message: format!("{}: {err}", self.path),
            }
        })?;
        let Some(raw) = raw else {
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&raw).map_err(|err| RecentsError::Read {
            key: key.to_owned(),
            message: format!("{}: {err}", self.path),
        })
    }
}

impl KeyValueStore for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, RecentsError> {
        Ok(self.read_map(key)?.remove(key))
    }

    fn put(&mut self, key: &str, value: String) -> Result<(), RecentsError> {
        let mut values = self.read_map(key).unwrap_or_else(|err| {
            warn!("replacing unreadable settings file: {err}");
            BTreeMap::new()
        });
        values.insert(key.to_owned(), value);
        let payload = serde_json::to_string_pretty(&values).map_err(RecentsError::Serialise)?;
        place_city_fs::write_utf8(&self.path, &payload).map_err(|err| RecentsError::Write {
            key: key.to_owned(),
            message: format!("{}: {err}", self.path),
        })
    }
}
