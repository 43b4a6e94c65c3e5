//! Data model for one translation run.
//!
//! `TranslationRequest` and `TranslationResponse` are the wire types of the
//! remote translation service; their field names are an external contract.

use serde::{Deserialize, Serialize};

use crate::enums::EntryKind;

/// One entry of a single directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// A discovered `test-<project>.c` file and the quoted includes it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    /// File name with the `test-` prefix and `.c` suffix removed.
    pub project_name: String,
    /// Path relative to the input root, `/`-separated.
    pub relative_file_path: String,
    /// Include base names (without `.h`) in source order. Not deduplicated.
    pub includes: Vec<String>,
}

/// One file of a bundle: path relative to the input root and its raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub code: String,
}

/// Request body posted to the translation service.
///
/// The unit's own file is always the last element of `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub project_name: String,
    pub content: Vec<SourceFile>,
}

impl TranslationRequest {
    /// The unit's own file, if the bundle is non-empty.
    #[must_use]
    pub fn unit_file(&self) -> Option<&SourceFile> {
        self.content.last()
    }

    /// Dependency files, i.e. everything except the trailing unit file.
    #[must_use]
    pub fn dependencies(&self) -> &[SourceFile] {
        self.content
            .split_last()
            .map_or(&[][..], |(_, deps)| deps)
    }
}

/// One generated file, relative to the unit's output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: String,
    pub code: String,
}

/// Response body returned by the translation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    /// Service-level status. `0` or an HTTP-style `2xx` value means success.
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub output: Vec<OutputFile>,
    /// Optional reason supplied by the service, usually on failure.
    #[serde(default, alias = "msg", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TranslationResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == 0 || (200..300).contains(&self.status)
    }

    /// Whether the service produced any files to write.
    #[must_use]
    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }
}
