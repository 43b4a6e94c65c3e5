use std::process::ExitCode;

use c2r_config::C2rConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `c2r config`.
pub fn handle(config: &C2rConfig, flags: &GlobalFlags) -> anyhow::Result<ExitCode> {
    output(config, flags.format)?;
    Ok(ExitCode::SUCCESS)
}
