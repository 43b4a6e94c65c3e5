use std::process::ExitCode;

use c2r_config::C2rConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: C2rConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Run(args) => commands::run::handle(&args, config, flags).await,
        Commands::Discover(args) => commands::discover::handle(&args, flags),
        Commands::Bundle(args) => commands::bundle::handle(&args, &config, flags).await,
        Commands::Config => commands::config::handle(&config, flags),
    }
}
