use c2r_config::C2rConfig;

use crate::cli::GlobalFlags;

/// Load the layered configuration, honouring `--config` and `.env`.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<C2rConfig> {
    let config = C2rConfig::load_with_dotenv(flags.config.as_deref())?;
    tracing::debug!(
        url = %config.service.translate_url(),
        concurrency = config.pipeline.concurrency,
        "configuration loaded"
    );
    Ok(config)
}
