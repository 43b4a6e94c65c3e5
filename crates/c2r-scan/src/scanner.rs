//! Directory listing and recursive file walking over the input tree.
//!
//! Hidden entries (names starting with `.`) are never reported. The recursive
//! walk follows symlinks, the same way a `stat`-based traversal would, and
//! turns a symlink that loops back to an ancestor into
//! [`ScanError::CycleDetected`] instead of recursing forever.

use std::path::{Path, PathBuf};

use c2r_core::{DirectoryEntry, EntryKind};
use ignore::WalkBuilder;

use crate::error::ScanError;

/// Fail with `NotFound` / `NotADirectory` unless `path` is a directory.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`], [`ScanError::NotADirectory`], or
/// [`ScanError::Io`] when the metadata cannot be read.
pub fn ensure_dir(path: &Path) -> Result<(), ScanError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ScanError::NotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ScanError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(ScanError::io(path, e)),
    }
}

/// List the non-hidden entries of one directory, sorted by name.
///
/// Symlinks are classified by their target. Dangling symlinks are skipped.
///
/// # Errors
///
/// Returns [`ScanError::NotFound`] or [`ScanError::NotADirectory`] for a bad
/// `path`, and [`ScanError::Io`] if the listing cannot be read.
pub fn scan(path: &Path) -> Result<Vec<DirectoryEntry>, ScanError> {
    ensure_dir(path)?;

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| ScanError::io(path, e))? {
        let entry = entry.map_err(|e| ScanError::io(path, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let entry_path = entry.path();
        let meta = match std::fs::metadata(&entry_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %entry_path.display(), "skipping dangling symlink");
                continue;
            }
            Err(e) => return Err(ScanError::io(entry_path, e)),
        };

        let kind = if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(DirectoryEntry { name, kind });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Recursively collect every non-hidden file under `root`.
///
/// Directories are visited in file-name order, so the result is
/// deterministic for a given tree. Paths are returned as walked (prefixed by
/// `root`).
///
/// # Errors
///
/// Returns [`ScanError::CycleDetected`] on a symlink loop, and
/// [`ScanError::Io`] / [`ScanError::Walk`] if a directory cannot be read.
pub fn walk_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    ensure_dir(root)?;

    let mut builder = WalkBuilder::new(root);
    // No gitignore semantics: only dot-entries are filtered.
    builder
        .standard_filters(false)
        .hidden(true)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                if is_dangling_link(&err) {
                    tracing::debug!(%err, "skipping dangling symlink");
                    continue;
                }
                return Err(map_walk_error(root, err));
            }
        };
        if entry.file_type().is_some_and(|ft| ft.is_file()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!(root = %root.display(), files = files.len(), "walked input tree");
    Ok(files)
}

/// Path of `path` relative to `root`, `/`-separated.
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}

fn map_walk_error(root: &Path, err: ignore::Error) -> ScanError {
    if let Some((ancestor, child)) = find_loop(&err) {
        return ScanError::CycleDetected {
            ancestor: ancestor.to_path_buf(),
            child: child.to_path_buf(),
        };
    }

    let message = err.to_string();
    let path = error_path(&err).map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    match err.into_io_error() {
        Some(source) => ScanError::io(path, source),
        None => ScanError::Walk(message),
    }
}

fn find_loop(err: &ignore::Error) -> Option<(&Path, &Path)> {
    match err {
        ignore::Error::Loop { ancestor, child } => Some((ancestor.as_path(), child.as_path())),
        ignore::Error::WithPath { err, .. }
        | ignore::Error::WithDepth { err, .. }
        | ignore::Error::WithLineNumber { err, .. } => find_loop(err),
        ignore::Error::Partial(errs) => errs.iter().find_map(find_loop),
        _ => None,
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

fn is_dangling_link(err: &ignore::Error) -> bool {
    find_loop(err).is_none()
        && err
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound)
}
