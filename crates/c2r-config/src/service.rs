//! Remote translation service configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_base_url() -> String {
    "http://gpt.livstyle.cn/api".to_string()
}

fn default_endpoint() -> String {
    "/singFile".to_string()
}

/// Default request timeout in seconds. Translations of large units are slow.
const fn default_timeout_secs() -> u64 {
    120
}

fn default_user_agent() -> String {
    format!("c2r/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Base URL of the translation API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path appended to `base_url` for the translate call.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Whole-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ServiceConfig {
    /// Full URL of the translate endpoint.
    #[must_use]
    pub fn translate_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.endpoint.is_empty() {
            return base.to_string();
        }
        let endpoint = self.endpoint.trim_start_matches('/');
        format!("{base}/{endpoint}")
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::invalid("service.base_url", "must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "service.timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
