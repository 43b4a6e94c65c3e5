//! # c2r-config
//!
//! Layered configuration loading for c2r using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`C2R_*` prefix, `__` as separator)
//! 2. An explicit file passed by the caller (`c2r --config FILE`)
//! 3. Project-level `.c2r/config.toml`
//! 4. User-level `~/.config/c2r/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `C2R_SERVICE__BASE_URL` -> `service.base_url`,
//! `C2R_PIPELINE__CONCURRENCY` -> `pipeline.concurrency`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use c2r_config::C2rConfig;
//!
//! let config = C2rConfig::load_with_dotenv(None).expect("config");
//! println!("translating via {}", config.service.translate_url());
//! ```

mod error;
mod pipeline;
mod service;

pub use error::ConfigError;
pub use pipeline::{PipelineConfig, validate_unit_dir};
pub use service::ServiceConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for all settings.
pub const ENV_PREFIX: &str = "C2R_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct C2rConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl C2rConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// `extra` is an additional TOML file layered above the project-local file.
    /// A missing `extra` file is an error; missing default locations are not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is invalid.
    pub fn load(extra: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = extra
            && !path.is_file()
        {
            return Err(ConfigError::invalid(
                "config",
                format!("file not found: {}", path.display()),
            ));
        }
        let config: Self = Self::figment(extra).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`C2rConfig::load`].
    pub fn load_with_dotenv(extra: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(extra)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    #[must_use]
    pub fn figment(extra: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".c2r/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject values that would make a run misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.service.validate()?;
        self.pipeline.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("c2r").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        let config = C2rConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.concurrency, 4);
        assert_eq!(config.service.timeout_secs, 120);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = C2rConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
