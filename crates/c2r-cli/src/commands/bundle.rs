use std::process::ExitCode;

use anyhow::{Context, bail};
use c2r_config::C2rConfig;
use c2r_core::{TranslationRequest, TranslationUnit};
use c2r_pipeline::bundle::build_request;
use c2r_scan::SourceIndex;
use serde::Serialize;

use crate::cli::commands::BundleArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::output::output;

#[derive(Debug, Serialize)]
struct BundleRow {
    path: String,
    role: &'static str,
    bytes: usize,
}

/// Handle `c2r bundle`: assemble one unit's request without sending it.
pub async fn handle(
    args: &BundleArgs,
    config: &C2rConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    let mode = args.include_match.unwrap_or(config.pipeline.include_match);
    let units = c2r_scan::discover(&args.input)
        .with_context(|| format!("failed to discover units under {}", args.input.display()))?;
    let unit = select_unit(&units, &args.project)?;
    let index = SourceIndex::build(&args.input).context("failed to index input tree")?;

    let request = build_request(&args.input, unit, &index, mode)
        .await
        .with_context(|| format!("failed to bundle {}", unit.relative_file_path))?;

    match flags.format {
        OutputFormat::Table => output(&bundle_rows(&request), flags.format)?,
        OutputFormat::Json | OutputFormat::Raw => output(&request, flags.format)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn select_unit<'a>(
    units: &'a [TranslationUnit],
    project: &str,
) -> anyhow::Result<&'a TranslationUnit> {
    let matches: Vec<&TranslationUnit> =
        units.iter().filter(|unit| unit.project_name == project).collect();
    match matches.as_slice() {
        [unit] => Ok(*unit),
        [] => bail!("no unit named test-{project}.c in the input tree"),
        many => bail!(
            "project '{project}' is defined by several units: {}",
            many.iter()
                .map(|unit| unit.relative_file_path.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn bundle_rows(request: &TranslationRequest) -> Vec<BundleRow> {
    let deps = request.dependencies().iter().map(|file| BundleRow {
        path: file.path.clone(),
        role: "dependency",
        bytes: file.code.len(),
    });
    let unit = request.unit_file().map(|file| BundleRow {
        path: file.path.clone(),
        role: "unit",
        bytes: file.code.len(),
    });
    deps.chain(unit).collect()
}
