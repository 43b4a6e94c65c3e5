//! # c2r-pipeline
//!
//! The per-run translation pipeline:
//! 1. Discover units and index the input tree (`c2r-scan`)
//! 2. Assemble each unit's bundle ([`bundle`])
//! 3. Submit it to the translation service (`c2r-client`)
//! 4. Replace the unit's output directory with the result ([`materialize`])
//!
//! [`Pipeline`] drives steps 2–4 for all units through a bounded worker pool
//! and reports every unit's outcome separately.

pub mod bundle;
pub mod config;
pub mod materialize;
pub mod runner;

mod error;

pub use config::RunConfig;
pub use error::{PipelineError, UnitError};
pub use materialize::MaterializeReport;
pub use runner::{Pipeline, RunEvent, RunReport, StopHandle, UnitReport, UnitStatus};
