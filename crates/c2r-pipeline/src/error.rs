//! Pipeline error types.
//!
//! [`PipelineError`] ends the whole run; [`UnitError`] ends one unit and is
//! reported alongside its siblings' outcomes.

use std::path::PathBuf;

use c2r_client::ClientError;
use c2r_core::CoreError;
use c2r_scan::ScanError;

/// Failures that abort a run before or outside unit processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Discovery or indexing of the input tree failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The output root cannot be created.
    #[error("cannot prepare output root {}: {source}", .path.display())]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A background task failed to complete.
    #[error("task failed: {0}")]
    Join(String),
}

/// Failures scoped to a single translation unit.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// The project name cannot be used as an output directory.
    #[error(transparent)]
    InvalidProjectName(#[from] CoreError),

    /// Several units resolve to the same output directory.
    #[error("output directory {} is claimed by several units: {}", .dir.display(), .projects.join(", "))]
    OutputCollision { dir: PathBuf, projects: Vec<String> },

    /// A unit or dependency file cannot be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The translation service call failed.
    #[error("translation failed: {0}")]
    TranslationFailed(#[from] ClientError),

    /// The service returned a path that would escape the unit directory.
    #[error("unsafe output path '{path}': {reason}")]
    UnsafeOutputPath { path: String, reason: String },

    /// The previous output directory could not be removed.
    #[error("failed to clear {}: {source}", .path.display())]
    ClearOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing failed after the old output was cleared.
    #[error("partial output: {written} file(s) written before {} failed: {source}", .path.display())]
    PartialOutputWrite {
        written: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UnitError {
    /// Whether the unit's output directory was left partially populated.
    #[must_use]
    pub const fn is_partial_output(&self) -> bool {
        matches!(self, Self::PartialOutputWrite { .. })
    }
}
