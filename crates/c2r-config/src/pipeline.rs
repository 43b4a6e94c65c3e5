//! Pipeline scheduling and layout configuration.

use std::path::{Component, Path};

use c2r_core::IncludeMatch;
use c2r_core::project::PROJECT_PLACEHOLDER;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of units processed at once.
const fn default_concurrency() -> usize {
    4
}

fn default_unit_dir() -> String {
    PROJECT_PLACEHOLDER.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Maximum number of units in flight (bundle, translate, materialize).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Include resolution mode: `exact` or `prefix`.
    #[serde(default)]
    pub include_match: IncludeMatch,

    /// Output subdirectory per unit, relative to the output root.
    /// `{project}` is replaced by the unit's project name.
    #[serde(default = "default_unit_dir")]
    pub unit_dir: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            include_match: IncludeMatch::default(),
            unit_dir: default_unit_dir(),
        }
    }
}

impl PipelineConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::invalid(
                "pipeline.concurrency",
                "must be at least 1",
            ));
        }
        validate_unit_dir(&self.unit_dir)
    }
}

/// Check that a unit directory template stays inside the output root.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] when the template is empty, absolute,
/// or contains a `..` segment.
pub fn validate_unit_dir(template: &str) -> Result<(), ConfigError> {
    if template.trim().is_empty() {
        return Err(ConfigError::invalid("pipeline.unit_dir", "must not be empty"));
    }
    let path = Path::new(template);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(ConfigError::invalid(
                    "pipeline.unit_dir",
                    "must not contain '..'",
                ));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::invalid(
                    "pipeline.unit_dir",
                    "must be relative to the output root",
                ));
            }
        }
    }
    Ok(())
}
