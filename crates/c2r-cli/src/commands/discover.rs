use std::process::ExitCode;

use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::commands::DiscoverArgs;
use crate::output::output;

/// Handle `c2r discover`.
pub fn handle(args: &DiscoverArgs, flags: &GlobalFlags) -> anyhow::Result<ExitCode> {
    let units = c2r_scan::discover(&args.input)
        .with_context(|| format!("failed to discover units under {}", args.input.display()))?;
    tracing::info!(units = units.len(), "discovery finished");
    output(&units, flags.format)?;
    Ok(ExitCode::SUCCESS)
}
