//! OpenAI-compatible HTTP gateway for chat completions and speech.
//!
//! Talks to `/v1/chat/completions` and `/v1/audio/speech`. The base URL can
//! be overridden for compatible services or for testing with wiremock.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::GatewayConfig;
use crate::telemetry;
use crate::types::{ChatOptions, ChatResponse, FinishReason, Message, SpeechRequest, Usage};
use crate::{LongformError, ModelGateway, Result};

/// Default base URL for the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const GATEWAY_NAME: &str = "openai";

/// Client for the OpenAI API.
#[derive(Clone)]
pub struct OpenAiGateway {
    api_key: String,
    http: Client,
    base_url: String,
    config: GatewayConfig,
}

impl OpenAiGateway {
    /// Create a gateway for the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>, config: GatewayConfig) -> Result<Self> {
        Self::with_base_url(api_key, config, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a gateway with a custom base URL and request timeout.
    pub fn with_base_url(
        api_key: impl Into<String>,
        config: GatewayConfig,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                LongformError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn chat_model<'a>(&'a self, options: &'a ChatOptions) -> &'a str {
        if options.model.is_empty() {
            &self.config.text_model
        } else {
            &options.model
        }
    }

    async fn post_chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        let model = self.chat_model(options);
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest {
                model,
                messages,
                temperature: options.temperature,
                max_tokens: options.max_tokens,
                top_p: options.top_p,
                seed: options.seed,
            })
            .send()
            .await
            .map_err(|e| LongformError::Http(e.to_string()))?;

        let response = check_status(response, model).await?;

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LongformError::Http(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(LongformError::EmptyResponse)?;

        if let Some(usage) = &body.usage {
            metrics::counter!(telemetry::TOKENS_TOTAL,
                "gateway" => GATEWAY_NAME, "direction" => "prompt")
            .increment(u64::from(usage.prompt_tokens));
            metrics::counter!(telemetry::TOKENS_TOTAL,
                "gateway" => GATEWAY_NAME, "direction" => "completion")
            .increment(u64::from(usage.completion_tokens));
        }

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: body.usage,
            model: body.model,
            finish_reason: match choice.finish_reason.as_deref() {
                Some("length") => FinishReason::Length,
                Some("content_filter") => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            },
        })
    }

    async fn post_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let model = if request.model.is_empty() {
            self.config.tts_model.as_str()
        } else {
            request.model.as_str()
        };
        let url = format!("{}/v1/audio/speech", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SpeechBody {
                model,
                input: &request.input,
                voice: &request.voice,
                response_format: "mp3",
            })
            .send()
            .await
            .map_err(|e| LongformError::Http(e.to_string()))?;

        let response = check_status(response, model).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| LongformError::Http(e.to_string()))?;
        if bytes.is_empty() {
            return Err(LongformError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }
}

/// Record request count and duration for one call.
fn record_request<T>(operation: &'static str, started: Instant, result: &Result<T>) {
    let status = if result.is_ok() { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "gateway" => GATEWAY_NAME, "operation" => operation, "status" => status)
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "gateway" => GATEWAY_NAME, "operation" => operation)
    .record(started.elapsed().as_secs_f64());
}

/// Check response status and map to the appropriate error.
async fn check_status(response: reqwest::Response, model: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status.as_u16() {
        401 => Err(LongformError::AuthenticationFailed),
        404 => Err(LongformError::ModelNotFound(model.to_string())),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(LongformError::RateLimited { retry_after })
        }
        code => {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("OpenAI API error: {status}"));
            Err(LongformError::Api {
                status: code,
                message,
            })
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl ModelGateway for OpenAiGateway {
    fn name(&self) -> &str {
        GATEWAY_NAME
    }

    #[instrument(skip_all, fields(turns = messages.len()))]
    async fn chat(&self, messages: &[Message], options: &ChatOptions) -> Result<ChatResponse> {
        let started = Instant::now();
        let result = self.post_chat(messages, options).await;
        record_request("chat", started, &result);
        if let Ok(response) = &result {
            debug!(
                chars = response.content.len(),
                finish_reason = ?response.finish_reason,
                "received completion"
            );
        }
        result
    }

    #[instrument(skip_all, fields(voice = %request.voice, chars = request.input.len()))]
    async fn synthesize_speech(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        let started = Instant::now();
        let result = self.post_speech(request).await;
        record_request("speech", started, &result);
        result
    }
}
