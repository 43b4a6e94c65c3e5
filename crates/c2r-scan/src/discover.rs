//! Translation unit discovery.
//!
//! Every non-hidden `test-<project>.c` file under the root is a unit. Its
//! text is read once here to extract the quoted includes; the bundle builder
//! reads it again when the request is assembled. [`discover_all`] keeps going
//! past unreadable unit files so a run can fail just those units.

use std::path::{Path, PathBuf};

use c2r_core::TranslationUnit;
use c2r_core::project::project_name_from_file_name;

use crate::error::ScanError;
use crate::includes::extract_includes;
use crate::scanner::{relative_path, walk_files};

/// A `test-<project>.c` file whose text could not be read.
#[derive(Debug)]
pub struct UnreadableUnit {
    pub project_name: String,
    pub relative_file_path: String,
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Result of a lenient discovery pass: readable units plus the units whose
/// file could not be read. Both lists are sorted by relative path.
#[derive(Debug, Default)]
pub struct Discovery {
    pub units: Vec<TranslationUnit>,
    pub unreadable: Vec<UnreadableUnit>,
}

impl Discovery {
    /// Total number of unit files found, readable or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len() + self.unreadable.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Discover all translation units under `root`, sorted by relative path.
///
/// # Errors
///
/// Returns [`ScanError`] if `root` is not a readable directory, the walk hits
/// a symlink cycle, or a unit file cannot be read.
pub fn discover(root: &Path) -> Result<Vec<TranslationUnit>, ScanError> {
    let Discovery { units, unreadable } = discover_all(root)?;
    match unreadable.into_iter().next() {
        Some(unit) => Err(ScanError::io(unit.path, unit.source)),
        None => Ok(units),
    }
}

/// Discover units without failing on unreadable unit files.
///
/// A unit whose file cannot be read is returned in
/// [`Discovery::unreadable`] so the caller can fail that unit alone.
///
/// # Errors
///
/// Returns [`ScanError`] if `root` is not a readable directory or the walk
/// hits a symlink cycle.
pub fn discover_all(root: &Path) -> Result<Discovery, ScanError> {
    let mut discovery = Discovery::default();

    for path in walk_files(root)? {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(project_name) = project_name_from_file_name(file_name) else {
            continue;
        };
        let relative_file_path = relative_path(root, &path);

        let source = match read_source(&path) {
            Ok(source) => source,
            Err(ScanError::Io { source, .. }) => {
                tracing::warn!(unit = %relative_file_path, %source, "unit file is unreadable");
                discovery.unreadable.push(UnreadableUnit {
                    project_name: project_name.to_string(),
                    relative_file_path,
                    path,
                    source,
                });
                continue;
            }
            Err(e) => return Err(e),
        };
        let includes = extract_includes(&source);
        tracing::debug!(
            unit = %relative_file_path,
            project = project_name,
            includes = includes.len(),
            "discovered translation unit"
        );

        discovery.units.push(TranslationUnit {
            project_name: project_name.to_string(),
            relative_file_path,
            includes,
        });
    }

    discovery
        .units
        .sort_by(|a, b| a.relative_file_path.cmp(&b.relative_file_path));
    discovery
        .unreadable
        .sort_by(|a, b| a.relative_file_path.cmp(&b.relative_file_path));
    Ok(discovery)
}

/// Read a source file as text, replacing invalid UTF-8 sequences.
///
/// # Errors
///
/// Returns [`ScanError::Io`] naming `path` if the file cannot be read.
pub fn read_source(path: &Path) -> Result<String, ScanError> {
    let bytes = std::fs::read(path).map_err(|e| ScanError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
