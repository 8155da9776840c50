//! Text-to-speech request types

use serde::{Deserialize, Serialize};

/// Maximum input length accepted by the speech endpoint, in characters.
pub const MAX_SPEECH_INPUT_CHARS: usize = 4096;

/// A speech synthesis request.
///
/// `voice` is the provider voice identifier, already resolved from any
/// friendly alias. An empty `model` means "use the configured TTS model".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub input: String,
    pub voice: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
}

impl SpeechRequest {
    pub fn new(input: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            voice: voice.into(),
            model: String::new(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}
