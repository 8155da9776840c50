//! Retry configuration and the retrying gateway decorator.
//!
//! Retries are a gateway concern: the multipart driver and the content
//! cache surface every failure unchanged. Wrap a gateway in
//! [`RetryingGateway`] to absorb rate limits and transient network errors
//! below them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::telemetry;
use crate::types::{ChatOptions, ChatResponse, Message, SpeechRequest};
use crate::{LongformError, ModelGateway, Result};

/// How many times a gateway call is attempted and how long to wait
/// between attempts. The wait doubles after each failure up to
/// `max_delay`; a rate-limit hint from the service overrides it.
///
/// ```rust
/// # use longform::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(5)
///     .initial_delay(Duration::from_millis(200));
/// assert_eq!(config.delay_for_attempt(1), Duration::from_millis(400));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total calls per request, the first one included. Default: 3.
    pub max_attempts: u32,
    /// Wait before the second call. Default: 500ms.
    pub initial_delay: Duration,
    /// Upper bound on any single wait. Default: 30s.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// One call, no waiting.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Wait after the failed call numbered `attempt`, counting from zero.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .initial_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }

    /// Like [`delay_for_attempt`](Self::delay_for_attempt), unless the
    /// service said how long to back off.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after.unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Execute an async operation, retrying transient errors.
///
/// Permanent errors are returned immediately.
pub(crate) async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    gateway: &str,
    operation: &str,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt + 1 < attempts => {
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "gateway" => gateway.to_owned(),
                    "operation" => operation.to_owned(),
                )
                .increment(1);
                let delay = config.effective_delay(attempt, e.retry_after());
                warn!(
                    gateway,
                    operation,
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Decorator that wraps a [`ModelGateway`] with retry logic.
///
/// Transient errors ([`LongformError::is_transient`]) are retried with
/// exponential backoff up to `config.max_attempts`, honouring
/// `retry_after` hints from rate limits.
pub struct RetryingGateway {
    inner: Arc<dyn ModelGateway>,
    config: RetryConfig,
}

impl RetryingGateway {
    pub fn new(inner: Arc<dyn ModelGateway>, config: RetryConfig) -> Self {
        Self { inner, config }
    }
}

#[async_trait]
impl ModelGateway for RetryingGateway {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        with_retry(&self.config, self.inner.name(), "chat", || {
            self.inner.chat(messages, options)
        })
        .await
    }

    async fn synthesize_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        with_retry(&self.config, self.inner.name(), "speech", || {
            self.inner.synthesize_speech(request)
        })
        .await
    }
}
