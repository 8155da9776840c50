//! Content-addressed cache keys.
//!
//! A key combines a human-readable task prefix, the generation strategy,
//! and a CRC-32 of the exact prompt text. The rendered file name is
//! `"<prefix> (<strategy>) [<crc32 hex>].txt"`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LongformError, Result};

/// Characters rejected in file names by at least one mainstream platform.
const ILLEGAL_FILE_NAME_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// How cached content is generated on a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// A single completion request.
    Oneshot,
    /// A multipart exchange, reassembled into one text.
    Multishot,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Oneshot => "oneshot",
            Strategy::Multishot => "multishot",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = LongformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "oneshot" => Ok(Strategy::Oneshot),
            "multishot" => Ok(Strategy::Multishot),
            other => Err(LongformError::InvalidInput(format!(
                "unknown strategy '{other}' (expected oneshot or multishot)"
            ))),
        }
    }
}

/// Address of one cached text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    prefix: String,
    strategy: Strategy,
    checksum: u32,
}

impl CacheKey {
    /// Derive a key from a task prefix, strategy, and prompt.
    ///
    /// The prefix is trimmed and sanitized into a file-name-safe form; an
    /// empty result fails with [`LongformError::InvalidKey`]. The prompt is
    /// checksummed exactly as given, whitespace included.
    pub fn new(prefix: &str, strategy: Strategy, prompt: &str) -> Result<Self> {
        let trimmed = prefix.trim();
        if trimmed.is_empty() {
            return Err(LongformError::InvalidKey(
                "cache key prefix is empty".to_string(),
            ));
        }
        let sanitized = sanitize_prefix(trimmed);
        if sanitized.is_empty() {
            return Err(LongformError::InvalidKey(format!(
                "cache key prefix {prefix:?} is empty after sanitization"
            )));
        }
        Ok(Self {
            prefix: sanitized,
            strategy,
            checksum: prompt_checksum(prompt),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// File name under which the entry is stored.
    pub fn file_name(&self) -> String {
        format!(
            "{} ({}) [{:08x}].txt",
            self.prefix, self.strategy, self.checksum
        )
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Remove characters that are illegal in file names, then trim.
pub fn sanitize_prefix(prefix: &str) -> String {
    prefix
        .chars()
        .filter(|c| !c.is_control() && !ILLEGAL_FILE_NAME_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// CRC-32 (IEEE) of the prompt's UTF-8 bytes.
pub fn prompt_checksum(prompt: &str) -> u32 {
    crc32fast::hash(prompt.as_bytes())
}
