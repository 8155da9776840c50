//! Configured gateway handle

mod builder;

pub use builder::{Longform, LongformBuilder};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::{ContentCache, ContentRequest};
use crate::completion::{self, MultipartOptions, MultipartOutcome};
use crate::config::GatewayConfig;
use crate::types::{ChatOptions, ChatResponse, Message, SpeechRequest};
use crate::{ModelGateway, Result, speech};

/// A gateway bundled with its configuration.
///
/// Produced by [`LongformBuilder::build`]; also constructible around any
/// [`ModelGateway`] (e.g. a test double) with [`Gateway::new`].
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<dyn ModelGateway>,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(inner: Arc<dyn ModelGateway>, config: GatewayConfig) -> Self {
        Self { inner, config }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Single completion for a prompt.
    pub async fn complete(&self, prompt: &str, options: &ChatOptions) -> Result<String> {
        completion::complete(self, prompt, options).await
    }

    /// Multipart exchange, returning every turn.
    pub async fn run_multipart(
        &self,
        prompt: &str,
        multipart: &MultipartOptions,
        options: &ChatOptions,
    ) -> Result<MultipartOutcome> {
        completion::run_multipart(self, prompt, multipart, options).await
    }

    /// Multipart exchange, reassembled into one text.
    pub async fn complete_multipart(
        &self,
        prompt: &str,
        multipart: &MultipartOptions,
        options: &ChatOptions,
    ) -> Result<String> {
        completion::complete_multipart(self, prompt, multipart, options).await
    }

    /// Cached generation through `cache`.
    pub async fn cached_content(
        &self,
        cache: &ContentCache,
        request: &ContentRequest,
    ) -> Result<String> {
        cache.get_or_generate(self, request).await
    }

    /// Synthesize `text` with `voice` (alias or provider voice) into an
    /// `.mp3` file.
    pub async fn write_speech(&self, text: &str, path: &Path, voice: &str) -> Result<()> {
        speech::write_speech(self, &self.config, text, path, voice).await
    }
}

#[async_trait]
impl ModelGateway for Gateway {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        self.inner.chat(messages, options).await
    }

    async fn synthesize_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.inner.synthesize_speech(request).await
    }
}
