//! Gateway configuration.
//!
//! Model identifiers and voice aliases live in an explicit
//! [`GatewayConfig`] handed to the builder. It can be loaded from TOML with
//! the following resolution order:
//! 1. an explicit path passed to [`GatewayConfig::load`]
//! 2. `<config dir>/longform/config.toml` (e.g. `~/.config/longform/config.toml`)
//! 3. built-in defaults
//!
//! ```toml
//! text_model = "gpt-4-turbo-preview"
//! tts_model = "tts-1"
//!
//! [voice_aliases]
//! narrator = "fable"
//! ```
//!
//! Aliases from the file are merged over the defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::{LongformError, Result};

/// Model identifiers and voice aliases for a gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// Chat model used when a request does not name one.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Speech model used when a request does not name one.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Friendly voice name → provider voice identifier.
    #[serde(default = "default_voice_aliases", deserialize_with = "merge_voice_aliases")]
    pub voice_aliases: HashMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            tts_model: default_tts_model(),
            voice_aliases: default_voice_aliases(),
        }
    }
}

fn default_text_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice_aliases() -> HashMap<String, String> {
    [
        ("default", "alloy"),
        ("neutral", "echo"),
        ("female", "nova"),
        ("male", "onyx"),
    ]
    .into_iter()
    .map(|(alias, voice)| (alias.to_string(), voice.to_string()))
    .collect()
}

fn merge_voice_aliases<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = HashMap::<String, String>::deserialize(deserializer)?;
    let mut aliases = default_voice_aliases();
    aliases.extend(overrides);
    Ok(aliases)
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Add or replace a voice alias.
    pub fn voice_alias(mut self, alias: impl Into<String>, voice: impl Into<String>) -> Self {
        self.voice_aliases.insert(alias.into(), voice.into());
        self
    }

    /// Map a friendly voice name to the provider voice. Unknown names
    /// pass through unchanged.
    pub fn resolve_voice<'a>(&'a self, voice: &'a str) -> &'a str {
        self.voice_aliases
            .get(voice)
            .map(String::as_str)
            .unwrap_or(voice)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| LongformError::Configuration(format!("failed to parse config: {e}")))
    }

    /// Load configuration using the standard resolution order.
    ///
    /// An explicit path must exist; the user config file is optional.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LongformError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_toml(&content)
    }
}

/// `<config dir>/longform/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("longform").join("config.toml"))
}
