//! Scan error types for c2r-scan.

use std::path::PathBuf;

/// Errors from listing, walking, and reading the input tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The root path does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The root path exists but is a file.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// A symlink points back at one of its ancestors.
    #[error("symlink cycle detected: {} -> {}", .child.display(), .ancestor.display())]
    CycleDetected { ancestor: PathBuf, child: PathBuf },

    /// I/O failure on a specific path.
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other walker failure.
    #[error("walk error: {0}")]
    Walk(String),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
