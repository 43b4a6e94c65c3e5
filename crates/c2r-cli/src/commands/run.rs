use std::process::ExitCode;

use anyhow::Context;
use c2r_client::TranslationClient;
use c2r_config::C2rConfig;
use c2r_pipeline::{Pipeline, RunConfig, RunEvent, RunReport, StopHandle, UnitStatus};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::cli::commands::RunArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;
use crate::progress::Progress;

/// Exit status when the run finished but some units failed or were cancelled.
pub const EXIT_UNITS_FAILED: u8 = 2;

#[derive(Debug, Serialize)]
struct UnitRow<'a> {
    project: &'a str,
    unit: &'a str,
    status: &'static str,
    files: Option<usize>,
    detail: String,
}

/// Handle `c2r run`.
pub async fn handle(
    args: &RunArgs,
    mut config: C2rConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    apply_overrides(&mut config, args);
    config.validate().context("invalid run settings")?;

    let client =
        TranslationClient::new(&config.service).context("failed to build translation client")?;
    tracing::info!(url = %client.url(), "using translation service");

    let pipeline = Pipeline::new(
        RunConfig::from_config(&args.input, &args.output, &config.pipeline),
        client,
    );
    let interrupt = watch_interrupt(pipeline.stop_handle());
    let (events, handle) = pipeline.start();
    track_progress(events).await;
    interrupt.abort();

    let report = handle
        .await
        .context("translation run task failed")?
        .context("translation run failed")?;

    match flags.format {
        OutputFormat::Table => {
            output(&unit_rows(&report), flags.format)?;
            if !flags.quiet {
                println!("{}", summary(&report));
            }
        }
        OutputFormat::Json | OutputFormat::Raw => output(&report, flags.format)?,
    }

    Ok(ExitCode::from(exit_status(&report)))
}

/// Process exit status for a finished run: 0 when clean, otherwise
/// [`EXIT_UNITS_FAILED`]. Units with no output still count as clean.
#[must_use]
pub const fn exit_status(report: &RunReport) -> u8 {
    if report.is_clean() { 0 } else { EXIT_UNITS_FAILED }
}

/// Command-line values win over every configuration layer.
fn apply_overrides(config: &mut C2rConfig, args: &RunArgs) {
    if let Some(concurrency) = args.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Some(mode) = args.include_match {
        config.pipeline.include_match = mode;
    }
    if let Some(unit_dir) = &args.unit_dir {
        config.pipeline.unit_dir.clone_from(unit_dir);
    }
    if let Some(url) = &args.service_url {
        config.service.base_url.clone_from(url);
    }
}

/// First Ctrl-C stops new units from starting; a second one exits at once.
fn watch_interrupt(stop: StopHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("interrupt received: waiting for running units, press Ctrl-C again to abort");
        stop.stop();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    })
}

async fn track_progress(mut events: UnboundedReceiver<RunEvent>) {
    let mut progress = Progress::spinner("discovering translation units");
    while let Some(event) = events.recv().await {
        match event {
            RunEvent::Discovered { units } => {
                progress.finish_clear();
                progress = Progress::bar(u64::try_from(units).unwrap_or(u64::MAX), "translating");
            }
            RunEvent::UnitStarted { project } => progress.set_message(&project),
            RunEvent::UnitSucceeded { .. }
            | RunEvent::UnitNoOutput { .. }
            | RunEvent::UnitCancelled { .. } => progress.inc(1),
            RunEvent::UnitFailed { project, error, .. } => {
                progress.println(&format!("{project}: {error}"));
                progress.inc(1);
            }
            RunEvent::AllDone(report) => {
                if report.is_clean() {
                    progress.finish_ok("done");
                } else {
                    progress.finish_err(&summary(&report));
                }
                return;
            }
        }
    }
    progress.finish_clear();
}

fn unit_rows(report: &RunReport) -> Vec<UnitRow<'_>> {
    report
        .units
        .iter()
        .map(|unit| {
            let (status, files, detail) = match &unit.status {
                UnitStatus::Succeeded {
                    files_written,
                    output_dir,
                } => ("succeeded", Some(*files_written), output_dir.display().to_string()),
                UnitStatus::NoOutput => (
                    "no_output",
                    None,
                    String::from("service returned no files; previous output kept"),
                ),
                UnitStatus::Failed {
                    error,
                    partial_output,
                } => {
                    let detail = if *partial_output {
                        format!("{error} (output directory partially written)")
                    } else {
                        error.clone()
                    };
                    ("failed", None, detail)
                }
                UnitStatus::Cancelled => ("cancelled", None, String::from("not started")),
            };
            UnitRow {
                project: &unit.project_name,
                unit: &unit.unit_path,
                status,
                files,
                detail,
            }
        })
        .collect()
}

fn summary(report: &RunReport) -> String {
    format!(
        "{} succeeded, {} no output, {} failed, {} cancelled",
        report.succeeded, report.no_output, report.failed, report.cancelled
    )
}
