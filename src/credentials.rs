//! Credential providers.
//!
//! The gateway never reads the process environment itself. A
//! [`CredentialProvider`] is handed to the builder, which resolves it once,
//! before any request is made.

use crate::{LongformError, Result};

/// Conventional environment variable holding the API key.
pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Source of the API key used to authenticate requests.
pub trait CredentialProvider: Send + Sync {
    /// Resolve the key, or fail with [`LongformError::MissingCredential`].
    fn api_key(&self) -> Result<String>;
}

/// A key supplied directly by the caller.
#[derive(Clone)]
pub struct StaticCredential {
    key: String,
}

impl StaticCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredential")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl CredentialProvider for StaticCredential {
    fn api_key(&self) -> Result<String> {
        if self.key.trim().is_empty() {
            return Err(LongformError::MissingCredential {
                source_name: "static credential".to_string(),
            });
        }
        Ok(self.key.clone())
    }
}

/// A key read from an environment variable, optionally seeded from a
/// `.env` file in the working directory or its parents.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
    dotenv: bool,
}

impl EnvCredential {
    /// Read `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self::var(DEFAULT_API_KEY_VAR)
    }

    /// Read a custom variable.
    pub fn var(name: impl Into<String>) -> Self {
        Self {
            var: name.into(),
            dotenv: false,
        }
    }

    /// Load a `.env` file before reading the variable. Variables already
    /// set in the environment take precedence over the file.
    pub fn with_dotenv(mut self) -> Self {
        self.dotenv = true;
        self
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredential {
    fn api_key(&self) -> Result<String> {
        if self.dotenv {
            check_dotenv(dotenvy::dotenv())?;
        }
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(LongformError::MissingCredential {
                source_name: format!("environment variable {}", self.var),
            }),
        }
    }
}

/// A missing `.env` file is fine; the variable may be set directly. A file
/// that exists but cannot be read or parsed is a configuration error.
fn check_dotenv<T>(result: dotenvy::Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(LongformError::Configuration(format!(
            "failed to load .env file: {e}"
        ))),
    }
}
