//! Snapshot and settings file helpers built on `cap-std` and `camino`.
//!
//! Every operation opens the containing directory with ambient authority and
//! then works relative to it, so callers only ever pass UTF-8 paths.
#![forbid(unsafe_code)]

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open the directory holding `path` and return it with the file name.
///
/// # Errors
/// Fails when `path` has no file name or its directory cannot be opened.
pub fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} should name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Read a UTF-8 file.
///
/// # Errors
/// Propagates IO failures, including a missing file.
pub fn read_utf8(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = open_parent(path)?;
    dir.read_to_string(name.as_str())
}

/// Read a UTF-8 file, treating a missing file or directory as `None`.
///
/// # Errors
/// Propagates IO failures other than "not found".
pub fn read_optional_utf8(path: &Utf8Path) -> io::Result<Option<String>> {
    match read_utf8(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Write `contents` to `path`, creating missing parent directories.
///
/// # Errors
/// Propagates directory creation and write failures.
pub fn write_utf8(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_parent(path)?;
    dir.write(name.as_str(), contents)
}

/// Whether `path` is a regular file. `Ok(false)` means something other than
/// a file exists there.
///
/// # Errors
/// Fails with [`io::ErrorKind::NotFound`] when nothing exists at `path`, and
/// with the underlying error when its directory cannot be opened.
pub fn is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Create every missing directory above `path`.
///
/// # Errors
/// Propagates failures opening the root or creating directories.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (root, relative) = split_root(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    root.create_dir_all(&relative)
}

/// Split `dir` into an opened root directory and the path below it.
///
/// Absolute paths are anchored at the filesystem root (or the drive prefix
/// on Windows); relative paths at the current directory.
///
/// # Errors
/// Fails on non-UTF-8 prefixes or when the root cannot be opened.
pub fn split_root(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let root = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR_STR)
        }
        Some(Component::RootDir) => Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR),
        _ => Utf8PathBuf::from("."),
    };
    let relative = if root == "." {
        dir.to_path_buf()
    } else {
        dir.strip_prefix(&root)
            .map_err(|_| io::Error::other(format!("{dir} is not below {root}")))?
            .to_path_buf()
    };
    let opened = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((opened, relative))
}
