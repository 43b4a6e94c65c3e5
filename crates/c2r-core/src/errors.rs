//! Cross-cutting error types for c2r.
//!
//! Component errors (`ScanError`, `ClientError`, `UnitError`) live in their
//! own crates. This enum only covers failures of the shared model.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A project name cannot be used as an output directory segment.
    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    /// Data failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}
