//! Bundle assembly: one unit plus its resolved dependencies.

use std::collections::HashSet;
use std::path::Path;

use c2r_core::{IncludeMatch, SourceFile, TranslationRequest, TranslationUnit};
use c2r_scan::SourceIndex;
use futures::future::try_join_all;

use crate::error::UnitError;

/// Build the request for `unit`.
///
/// Dependencies are added in include order, then match order. Each resolved
/// path appears once (first occurrence wins) and the unit's own file is never
/// listed as a dependency, so it is always the last entry.
///
/// # Errors
///
/// Returns [`UnitError::Io`] if any file of the bundle cannot be read. No
/// partial bundle is returned.
pub async fn build_request(
    input_root: &Path,
    unit: &TranslationUnit,
    index: &SourceIndex,
    mode: IncludeMatch,
) -> Result<TranslationRequest, UnitError> {
    let paths = bundle_paths(unit, index, mode);
    let content = try_join_all(paths.into_iter().map(|path| read_entry(input_root, path))).await?;

    tracing::debug!(
        project = %unit.project_name,
        files = content.len(),
        "bundle assembled"
    );
    Ok(TranslationRequest {
        project_name: unit.project_name.clone(),
        content,
    })
}

/// Ordered, deduplicated relative paths of a unit's bundle.
#[must_use]
pub fn bundle_paths(unit: &TranslationUnit, index: &SourceIndex, mode: IncludeMatch) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::from([unit.relative_file_path.clone()]);

    let mut deps: Vec<String> = Vec::new();
    for include in &unit.includes {
        let matches = index.find_matches(include, mode);
        if matches.is_empty() {
            tracing::debug!(project = %unit.project_name, include, "include not found in input tree");
        }
        for path in matches {
            if seen.insert(path.clone()) {
                deps.push(path);
            }
        }
    }

    deps.push(unit.relative_file_path.clone());
    deps
}

async fn read_entry(input_root: &Path, path: String) -> Result<SourceFile, UnitError> {
    let full = input_root.join(&path);
    let bytes = tokio::fs::read(&full)
        .await
        .map_err(|source| UnitError::Io { path: full, source })?;
    Ok(SourceFile {
        path,
        code: String::from_utf8_lossy(&bytes).into_owned(),
    })
}
