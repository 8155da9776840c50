//! Writing synthesized speech to disk.

use std::path::Path;

use tracing::info;

use crate::config::GatewayConfig;
use crate::types::{MAX_SPEECH_INPUT_CHARS, SpeechRequest};
use crate::{LongformError, ModelGateway, Result};

/// Synthesize `text` and write the audio to `path`.
///
/// `voice` may be a friendly alias from the config or a provider voice
/// name. The path must end in `.mp3`, and the text may not exceed
/// [`MAX_SPEECH_INPUT_CHARS`] characters.
pub async fn write_speech(
    gateway: &dyn ModelGateway,
    config: &GatewayConfig,
    text: &str,
    path: &Path,
    voice: &str,
) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) != Some("mp3") {
        return Err(LongformError::InvalidInput(format!(
            "speech output must be an .mp3 file: {}",
            path.display()
        )));
    }
    let chars = text.chars().count();
    if chars > MAX_SPEECH_INPUT_CHARS {
        return Err(LongformError::InvalidInput(format!(
            "speech input is {chars} characters (max {MAX_SPEECH_INPUT_CHARS})"
        )));
    }

    let mapped = config.resolve_voice(voice);
    let voice_label = if mapped == voice {
        voice.to_string()
    } else {
        format!("{voice} ({mapped})")
    };
    info!(chars, voice = %voice_label, "requesting speech");

    let request = SpeechRequest::new(text, mapped).model(config.tts_model.clone());
    let audio = gateway.synthesize_speech(&request).await?;

    std::fs::write(path, &audio)?;
    if !path.exists() {
        return Err(LongformError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("speech file missing after write: {}", path.display()),
        )));
    }
    info!(path = %path.display(), bytes = audio.len(), "wrote speech");
    Ok(())
}
