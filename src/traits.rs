//! Core ModelGateway trait

use async_trait::async_trait;

use crate::{ChatOptions, ChatResponse, LongformError, Message, Result, SpeechRequest};

/// The remote completion service as seen by the core.
///
/// Implementations send the full message history and return exactly one
/// assistant turn. Transport failures (rate limits, network errors,
/// malformed responses) are returned as-is; retrying belongs to the
/// implementation (see [`RetryingGateway`](crate::providers::RetryingGateway)),
/// never to the multipart driver.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Gateway name for logging/debugging.
    fn name(&self) -> &str;

    /// Non-streaming chat completion
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse>;

    /// Synthesize speech audio for the request, returning encoded bytes.
    async fn synthesize_speech(&self, _request: &SpeechRequest) -> Result<Vec<u8>> {
        Err(LongformError::NotImplemented("synthesize_speech"))
    }
}
