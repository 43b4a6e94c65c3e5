//! Output materialization: replace a unit's output directory with the files
//! returned by the translation service.
//!
//! Every output path is validated before the old directory is removed, so a
//! malformed response never destroys previous output. Once the directory has
//! been cleared, a write failure leaves it partially populated and is reported
//! as [`UnitError::PartialOutputWrite`].

use std::path::{Component, Path, PathBuf};

use c2r_core::TranslationResponse;
use serde::Serialize;

use crate::error::UnitError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializeReport {
    pub output_dir: PathBuf,
    pub files_written: usize,
}

/// Clear `unit_output_dir` and write every file of `response` under it.
///
/// # Errors
///
/// - [`UnitError::UnsafeOutputPath`] before anything is touched on disk
/// - [`UnitError::ClearOutput`] if the old directory cannot be removed
/// - [`UnitError::PartialOutputWrite`] if a directory or file cannot be
///   created after clearing
pub async fn materialize(
    response: &TranslationResponse,
    unit_output_dir: &Path,
) -> Result<MaterializeReport, UnitError> {
    let targets = response
        .output
        .iter()
        .map(|file| Ok((safe_join(unit_output_dir, &file.path)?, file.code.as_str())))
        .collect::<Result<Vec<_>, UnitError>>()?;

    clear_dir(unit_output_dir).await?;
    tokio::fs::create_dir_all(unit_output_dir)
        .await
        .map_err(|source| UnitError::PartialOutputWrite {
            written: 0,
            path: unit_output_dir.to_path_buf(),
            source,
        })?;

    let mut written = 0;
    for (path, code) in targets {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| UnitError::PartialOutputWrite {
                    written,
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&path, code)
            .await
            .map_err(|source| UnitError::PartialOutputWrite {
                written,
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), "wrote output file");
        written += 1;
    }

    Ok(MaterializeReport {
        output_dir: unit_output_dir.to_path_buf(),
        files_written: written,
    })
}

/// Remove `dir` recursively. A missing directory is not an error.
async fn clear_dir(dir: &Path) -> Result<(), UnitError> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {
            tracing::debug!(dir = %dir.display(), "cleared previous output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(UnitError::ClearOutput {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Join a service-supplied relative path onto `base`, refusing anything that
/// could land outside of it.
fn safe_join(base: &Path, relative: &str) -> Result<PathBuf, UnitError> {
    let unsafe_path = |reason: &str| UnitError::UnsafeOutputPath {
        path: relative.to_string(),
        reason: reason.to_string(),
    };

    if relative.trim().is_empty() {
        return Err(unsafe_path("path is empty"));
    }

    let mut joined = base.to_path_buf();
    let mut has_file = false;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                has_file = true;
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(unsafe_path("contains '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path("must be relative"));
            }
        }
    }
    if !has_file {
        return Err(unsafe_path("does not name a file"));
    }
    Ok(joined)
}
