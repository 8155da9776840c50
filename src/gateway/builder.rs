//! Builder for configuring gateway instances

use std::sync::Arc;

use tracing::debug;

use super::Gateway;
use crate::config::GatewayConfig;
use crate::credentials::CredentialProvider;
use crate::providers::openai::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::providers::{OpenAiGateway, RetryConfig, RetryingGateway};
use crate::{LongformError, ModelGateway, Result};

/// Main entry point for creating gateway instances.
pub struct Longform;

impl Longform {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> LongformBuilder {
        LongformBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct LongformBuilder {
    credentials: Option<Arc<dyn CredentialProvider>>,
    config: GatewayConfig,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    retry: Option<RetryConfig>,
}

impl LongformBuilder {
    pub fn new() -> Self {
        Self {
            credentials: None,
            config: GatewayConfig::default(),
            base_url: None,
            timeout_secs: None,
            retry: None,
        }
    }

    /// Set the credential source. Resolved once, in [`build`](Self::build).
    pub fn credentials(mut self, provider: impl CredentialProvider + 'static) -> Self {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Set models and voice aliases.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Point at an OpenAI-compatible service other than the public API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout (seconds). Default: 120.
    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Retry transient failures inside the gateway.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Build the gateway.
    ///
    /// Fails with [`LongformError::MissingCredential`] when no credential is
    /// available; nothing is sent over the network here.
    pub fn build(self) -> Result<Gateway> {
        let credentials = self
            .credentials
            .ok_or_else(|| LongformError::MissingCredential {
                source_name: "credential provider".to_string(),
            })?;
        let api_key = credentials.api_key()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        debug!(%base_url, timeout_secs, text_model = %self.config.text_model, "building gateway");

        let client: Arc<dyn ModelGateway> = Arc::new(OpenAiGateway::with_base_url(
            api_key,
            self.config.clone(),
            base_url,
            timeout_secs,
        )?);

        let inner: Arc<dyn ModelGateway> = match self.retry {
            Some(retry) => Arc::new(RetryingGateway::new(client, retry)),
            None => client,
        };

        Ok(Gateway::new(inner, self.config))
    }
}

impl Default for LongformBuilder {
    fn default() -> Self {
        Self::new()
    }
}
