//! Per-run configuration.

use std::path::PathBuf;

use c2r_config::PipelineConfig;
use c2r_core::IncludeMatch;
use c2r_core::project::render_unit_dir;

/// Everything one pipeline invocation needs besides the translator.
///
/// A fresh value is built for every run; nothing is kept between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    /// Maximum number of units in flight. Values below 1 are treated as 1.
    pub concurrency: usize,
    pub include_match: IncludeMatch,
    /// Unit output directory template, relative to `output_root`.
    pub unit_dir: String,
}

impl RunConfig {
    /// Run configuration with default pipeline settings.
    #[must_use]
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self::from_config(input_root, output_root, &PipelineConfig::default())
    }

    #[must_use]
    pub fn from_config(
        input_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        pipeline: &PipelineConfig,
    ) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            concurrency: pipeline.concurrency,
            include_match: pipeline.include_match,
            unit_dir: pipeline.unit_dir.clone(),
        }
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub const fn with_include_match(mut self, mode: IncludeMatch) -> Self {
        self.include_match = mode;
        self
    }

    #[must_use]
    pub fn with_unit_dir(mut self, template: impl Into<String>) -> Self {
        self.unit_dir = template.into();
        self
    }

    /// Output directory of the unit named `project`.
    #[must_use]
    pub fn unit_output_dir(&self, project: &str) -> PathBuf {
        self.output_root.join(render_unit_dir(&self.unit_dir, project))
    }

    pub(crate) fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
