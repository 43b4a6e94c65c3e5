//! Run orchestration.
//!
//! Discovery and indexing happen once, on a blocking thread. Units are then
//! fed through a semaphore-bounded pool; each unit runs bundle → translate →
//! materialize in order, and its outcome is reported independently of its
//! siblings. Progress is published as [`RunEvent`]s on an unbounded channel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use c2r_client::Translate;
use c2r_core::project::validate_project_name;
use c2r_core::{IncludeMatch, TranslationUnit};
use c2r_scan::{Discovery, ScanError, SourceIndex};
use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};

use crate::bundle::build_request;
use crate::config::RunConfig;
use crate::error::{PipelineError, UnitError};
use crate::materialize::{MaterializeReport, materialize};

// ── Events and reports ─────────────────────────────────────────────

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// Discovery finished; `units` units will be considered.
    Discovered { units: usize },
    UnitStarted { project: String },
    UnitSucceeded {
        project: String,
        files_written: usize,
        output_dir: PathBuf,
    },
    /// The service answered successfully but returned no files. Previous
    /// output, if any, was left untouched.
    UnitNoOutput { project: String },
    UnitFailed {
        project: String,
        error: String,
        partial_output: bool,
    },
    /// The unit was never started because the run was stopped.
    UnitCancelled { project: String },
    AllDone(RunReport),
}

/// Final state of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Succeeded {
        files_written: usize,
        output_dir: PathBuf,
    },
    NoOutput,
    Failed {
        error: String,
        partial_output: bool,
    },
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub project_name: String,
    pub unit_path: String,
    #[serde(flatten)]
    pub status: UnitStatus,
}

/// Per-unit outcomes of a run plus tallies. There is no overall verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub units: Vec<UnitReport>,
    pub succeeded: usize,
    pub no_output: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl RunReport {
    fn from_units(mut units: Vec<UnitReport>) -> Self {
        units.sort_by(|a, b| a.unit_path.cmp(&b.unit_path));
        let mut report = Self::default();
        for unit in &units {
            match unit.status {
                UnitStatus::Succeeded { .. } => report.succeeded += 1,
                UnitStatus::NoOutput => report.no_output += 1,
                UnitStatus::Failed { .. } => report.failed += 1,
                UnitStatus::Cancelled => report.cancelled += 1,
            }
        }
        report.units = units;
        report
    }

    /// True when no unit failed or was cancelled.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }

    #[must_use]
    pub fn unit(&self, project: &str) -> Option<&UnitReport> {
        self.units.iter().find(|u| u.project_name == project)
    }
}

// ── Stop handle ────────────────────────────────────────────────────

/// Lets a caller refuse to start further units. Units already started run to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ── Pipeline ───────────────────────────────────────────────────────

pub struct Pipeline<T> {
    config: RunConfig,
    translator: Arc<T>,
    stop: StopHandle,
}

enum UnitSuccess {
    Written(MaterializeReport),
    NoOutput,
}

impl<T: Translate + 'static> Pipeline<T> {
    pub fn new(config: RunConfig, translator: T) -> Self {
        Self {
            config,
            translator: Arc::new(translator),
            stop: StopHandle::default(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run on a background task and return the event stream plus the final
    /// result. The stream ends after [`RunEvent::AllDone`] (or early, on a
    /// fatal error).
    pub fn start(
        self,
    ) -> (
        mpsc::UnboundedReceiver<RunEvent>,
        JoinHandle<Result<RunReport, PipelineError>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move { self.run(tx).await });
        (rx, handle)
    }

    /// Execute one full run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] only for run-level failures (bad input root,
    /// symlink cycle, unwritable output root). Unit failures, including a unit
    /// file that cannot be read, are reported in the returned [`RunReport`].
    pub async fn run(
        &self,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> Result<RunReport, PipelineError> {
        let (discovery, index) = self.discover().await?;
        tracing::info!(
            units = discovery.len(),
            sources = index.len(),
            input = %self.config.input_root.display(),
            "discovered translation units"
        );
        let _ = events.send(RunEvent::Discovered {
            units: discovery.len(),
        });
        let Discovery { units, unreadable } = discovery;

        tokio::fs::create_dir_all(&self.config.output_root)
            .await
            .map_err(|source| PipelineError::OutputRoot {
                path: self.config.output_root.clone(),
                source,
            })?;

        let index = Arc::new(index);
        let semaphore = Arc::new(Semaphore::new(self.config.effective_concurrency()));
        let mut reports = Vec::new();
        let mut set = JoinSet::new();
        let mut in_flight: HashMap<tokio::task::Id, (String, String)> = HashMap::new();

        for bad in unreadable {
            let unit = TranslationUnit {
                project_name: bad.project_name,
                relative_file_path: bad.relative_file_path,
                includes: Vec::new(),
            };
            let error = UnitError::Io {
                path: bad.path,
                source: bad.source,
            };
            reports.push(finish_unit(&unit, Err(error), &events));
        }

        for (unit, planned) in plan_units(&self.config, units) {
            let dir = match planned {
                Ok(dir) => dir,
                Err(error) => {
                    reports.push(finish_unit(&unit, Err(error), &events));
                    continue;
                }
            };

            if self.stop.is_stopped() {
                reports.push(cancel_unit(&unit, &events));
                continue;
            }
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                reports.push(cancel_unit(&unit, &events));
                continue;
            };
            if self.stop.is_stopped() {
                drop(permit);
                reports.push(cancel_unit(&unit, &events));
                continue;
            }

            tracing::info!(project = %unit.project_name, unit = %unit.relative_file_path, "unit started");
            let _ = events.send(RunEvent::UnitStarted {
                project: unit.project_name.clone(),
            });

            let ids = (unit.project_name.clone(), unit.relative_file_path.clone());
            let input_root = self.config.input_root.clone();
            let mode = self.config.include_match;
            let index = Arc::clone(&index);
            let translator = Arc::clone(&self.translator);
            let events = events.clone();
            let handle = set.spawn(async move {
                let _permit = permit;
                let result =
                    process_unit(&input_root, &unit, &index, mode, translator.as_ref(), &dir).await;
                finish_unit(&unit, result, &events)
            });
            in_flight.insert(handle.id(), ids);
        }

        while let Some(joined) = set.join_next_with_id().await {
            match joined {
                Ok((_, report)) => reports.push(report),
                Err(error) => {
                    let (project_name, unit_path) =
                        in_flight.remove(&error.id()).unwrap_or_default();
                    tracing::error!(project = %project_name, %error, "unit task aborted");
                    let message = format!("unit task aborted: {error}");
                    let _ = events.send(RunEvent::UnitFailed {
                        project: project_name.clone(),
                        error: message.clone(),
                        partial_output: false,
                    });
                    reports.push(UnitReport {
                        project_name,
                        unit_path,
                        status: UnitStatus::Failed {
                            error: message,
                            partial_output: false,
                        },
                    });
                }
            }
        }

        let report = RunReport::from_units(reports);
        tracing::info!(
            succeeded = report.succeeded,
            no_output = report.no_output,
            failed = report.failed,
            cancelled = report.cancelled,
            "run finished"
        );
        let _ = events.send(RunEvent::AllDone(report.clone()));
        Ok(report)
    }

    async fn discover(&self) -> Result<(Discovery, SourceIndex), PipelineError> {
        let input_root = self.config.input_root.clone();
        let scanned = tokio::task::spawn_blocking(move || -> Result<_, ScanError> {
            let discovery = c2r_scan::discover_all(&input_root)?;
            let index = SourceIndex::build(&input_root)?;
            Ok((discovery, index))
        })
        .await
        .map_err(|e| PipelineError::Join(e.to_string()))?;
        Ok(scanned?)
    }
}

/// Resolve each unit's output directory, rejecting unsafe project names and
/// directories claimed by more than one unit.
fn plan_units(
    config: &RunConfig,
    units: Vec<TranslationUnit>,
) -> Vec<(TranslationUnit, Result<PathBuf, UnitError>)> {
    let planned: Vec<(TranslationUnit, Result<PathBuf, UnitError>)> = units
        .into_iter()
        .map(|unit| {
            let dir = validate_project_name(&unit.project_name)
                .map(|()| config.unit_output_dir(&unit.project_name))
                .map_err(UnitError::from);
            (unit, dir)
        })
        .collect();

    let mut claims: HashMap<&Path, Vec<&str>> = HashMap::new();
    for (unit, dir) in &planned {
        if let Ok(dir) = dir {
            claims
                .entry(dir.as_path())
                .or_default()
                .push(unit.project_name.as_str());
        }
    }
    let collisions: HashMap<PathBuf, Vec<String>> = claims
        .into_iter()
        .filter(|(_, projects)| projects.len() > 1)
        .map(|(dir, projects)| {
            (
                dir.to_path_buf(),
                projects.into_iter().map(ToString::to_string).collect(),
            )
        })
        .collect();

    planned
        .into_iter()
        .map(|(unit, dir)| {
            let dir = dir.and_then(|dir| match collisions.get(&dir) {
                Some(projects) => Err(UnitError::OutputCollision {
                    dir,
                    projects: projects.clone(),
                }),
                None => Ok(dir),
            });
            (unit, dir)
        })
        .collect()
}

async fn process_unit<T: Translate>(
    input_root: &Path,
    unit: &TranslationUnit,
    index: &SourceIndex,
    mode: IncludeMatch,
    translator: &T,
    output_dir: &Path,
) -> Result<UnitSuccess, UnitError> {
    let request = build_request(input_root, unit, index, mode).await?;
    let response = translator.translate(&request).await?;
    if !response.has_output() {
        return Ok(UnitSuccess::NoOutput);
    }
    let report = materialize(&response, output_dir).await?;
    Ok(UnitSuccess::Written(report))
}

fn finish_unit(
    unit: &TranslationUnit,
    result: Result<UnitSuccess, UnitError>,
    events: &mpsc::UnboundedSender<RunEvent>,
) -> UnitReport {
    let project = unit.project_name.clone();
    let (status, event) = match result {
        Ok(UnitSuccess::Written(report)) => {
            tracing::info!(
                project = %project,
                files = report.files_written,
                dir = %report.output_dir.display(),
                "unit translated"
            );
            (
                UnitStatus::Succeeded {
                    files_written: report.files_written,
                    output_dir: report.output_dir.clone(),
                },
                RunEvent::UnitSucceeded {
                    project: project.clone(),
                    files_written: report.files_written,
                    output_dir: report.output_dir,
                },
            )
        }
        Ok(UnitSuccess::NoOutput) => {
            tracing::warn!(project = %project, "translation produced no output; previous output left in place");
            (
                UnitStatus::NoOutput,
                RunEvent::UnitNoOutput {
                    project: project.clone(),
                },
            )
        }
        Err(error) => {
            let partial_output = error.is_partial_output();
            if partial_output {
                tracing::warn!(project = %project, %error, "output directory left partially written");
            } else {
                tracing::warn!(project = %project, %error, "unit failed");
            }
            let message = error.to_string();
            (
                UnitStatus::Failed {
                    error: message.clone(),
                    partial_output,
                },
                RunEvent::UnitFailed {
                    project: project.clone(),
                    error: message,
                    partial_output,
                },
            )
        }
    };

    let _ = events.send(event);
    UnitReport {
        project_name: project,
        unit_path: unit.relative_file_path.clone(),
        status,
    }
}

fn cancel_unit(unit: &TranslationUnit, events: &mpsc::UnboundedSender<RunEvent>) -> UnitReport {
    tracing::info!(project = %unit.project_name, "unit not started: run stopped");
    let _ = events.send(RunEvent::UnitCancelled {
        project: unit.project_name.clone(),
    });
    UnitReport {
        project_name: unit.project_name.clone(),
        unit_path: unit.relative_file_path.clone(),
        status: UnitStatus::Cancelled,
    }
}
