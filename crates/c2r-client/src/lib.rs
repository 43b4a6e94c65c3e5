//! # c2r-client
//!
//! HTTP client for the remote translation service.
//!
//! One call per unit: the bundle is posted as JSON and the service answers
//! with the generated files. There are no retries; a failure aborts only the
//! unit that issued the call.

mod error;
mod http;

pub use error::ClientError;

use std::future::Future;
use std::time::Duration;

use c2r_config::ServiceConfig;
use c2r_core::{TranslationRequest, TranslationResponse};

/// Anything that can turn a bundle into generated output files.
///
/// The pipeline is generic over this trait so tests can substitute canned
/// responses for the remote service.
pub trait Translate: Send + Sync {
    fn translate(
        &self,
        request: &TranslationRequest,
    ) -> impl Future<Output = Result<TranslationResponse, ClientError>> + Send;
}

/// reqwest-backed client for the translation endpoint.
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    url: reqwest::Url,
}

impl TranslationClient {
    /// Build a client from the service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if the endpoint URL does not parse,
    /// or [`ClientError::Http`] if the HTTP client cannot be constructed.
    pub fn new(config: &ServiceConfig) -> Result<Self, ClientError> {
        let raw = config.translate_url();
        let url = reqwest::Url::parse(&raw).map_err(|e| ClientError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, url })
    }

    /// The endpoint requests are posted to.
    #[must_use]
    pub const fn url(&self) -> &reqwest::Url {
        &self.url
    }

    /// Post `request` to the service and decode its answer.
    ///
    /// An empty `output` list is a successful answer meaning "nothing to
    /// write".
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on transport failures and timeouts
    /// - [`ClientError::Api`] on a non-2xx HTTP status
    /// - [`ClientError::Parse`] if the body is not a translation response
    /// - [`ClientError::Service`] if the body's `status` marks an error
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, ClientError> {
        tracing::debug!(
            project = %request.project_name,
            files = request.content.len(),
            url = %self.url,
            "posting translation request"
        );

        let resp = self.http.post(self.url.clone()).json(request).send().await?;
        let resp = crate::http::check_response(resp).await?;
        let body = resp.text().await?;

        let response: TranslationResponse =
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        if !response.is_success() {
            return Err(ClientError::Service {
                status: response.status,
                message: response.message.unwrap_or_default(),
            });
        }

        tracing::debug!(
            project = %request.project_name,
            outputs = response.output.len(),
            "translation response received"
        );
        Ok(response)
    }
}

impl Translate for TranslationClient {
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, ClientError> {
        Self::translate(self, request).await
    }
}
