//! Test helpers for building snapshot files on disk.

use camino::{Utf8Path, Utf8PathBuf};
use place_city_core::test_support::{origin_host, origin_venues};
use place_city_core::{HostCapabilities, MemoryHost};
use tempfile::TempDir;

/// Temporary workspace holding a snapshot, its edited copy, and recents.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) snapshot: Utf8PathBuf,
    pub(super) output: Utf8PathBuf,
    pub(super) recents: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            snapshot: root.join("host.json"),
            output: root.join("edited/host.json"),
            recents: root.join("settings/recents.json"),
            root,
            _dir: dir,
        }
    }

    /// Write the origin fixture with both venues selected.
    pub(super) fn write_selected_origin(&self) {
        let mut host = origin_host(HostCapabilities::default());
        host.select(origin_venues());
        write_host(&self.snapshot, &host);
    }
}

pub(super) fn write_host(path: &Utf8Path, host: &MemoryHost) {
    let payload = serde_json::to_string_pretty(host).expect("serialise host");
    write_utf8(path, payload.as_bytes());
}

pub(super) fn read_host(path: &Utf8Path) -> MemoryHost {
    let raw = std::fs::read_to_string(path).expect("read snapshot");
    serde_json::from_str(&raw).expect("parse snapshot")
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}
