//! Loading and saving JSON map snapshots.

use camino::Utf8Path;
use place_city_core::MemoryHost;

use crate::CliError;

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match place_city_fs::is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load a JSON-encoded [`MemoryHost`] from disk.
pub(crate) fn load_snapshot(path: &Utf8Path) -> Result<MemoryHost, CliError> {
    let raw = place_city_fs::read_utf8(path).map_err(|source| CliError::ReadSnapshot {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::ParseSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `host` to `path` as pretty JSON.
pub(crate) fn save_snapshot(path: &Utf8Path, host: &MemoryHost) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(host).map_err(CliError::Serialise)?;
    payload.push('\n');
    place_city_fs::write_utf8(path, &payload).map_err(|source| CliError::WriteSnapshot {
        path: path.to_path_buf(),
        source,
    })
}
