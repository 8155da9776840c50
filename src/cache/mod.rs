//! Content-addressed response cache.
//!
//! [`ContentCache`] maps a (task prefix, strategy, prompt) triple to text
//! that was generated once and kept. A hit skips the gateway entirely; a
//! miss generates with the requested [`Strategy`] and stores the result.
//! Entries never expire and are never invalidated; delete the backing file
//! to force regeneration.
//!
//! # Backends
//!
//! Storage sits behind [`CacheBackend`]:
//!
//! - [`DiskCache`]: flat directory of `.txt` files, persistent across runs.
//! - [`MemoryCache`]: in-process map, for tests and single-run dedup.
//!
//! # Concurrency
//!
//! The at-most-one-call guarantee holds for sequential use within one
//! process. Concurrent callers racing on a fresh key may each miss, each
//! call the gateway, and each write; the last write wins.

pub mod disk;
pub mod key;
pub mod memory;

pub use disk::DiskCache;
pub use key::{CacheKey, Strategy, prompt_checksum, sanitize_prefix};
pub use memory::MemoryCache;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::completion::{MultipartOptions, complete, complete_multipart};
use crate::telemetry;
use crate::types::ChatOptions;
use crate::{ModelGateway, Result};

/// Key-value storage for generated texts.
///
/// Implementations store text exactly as given minus trailing whitespace,
/// and return it unchanged on later lookups.
pub trait CacheBackend: Send + Sync {
    /// Look up a stored text. `None` on miss.
    fn get(&self, key: &CacheKey) -> Result<Option<String>>;

    /// Store (or overwrite) the text for a key.
    fn put(&self, key: &CacheKey, text: &str) -> Result<()>;
}

/// One cacheable generation request.
///
/// `options` and `multipart` are forwarded to the generator on a miss and
/// do not participate in the key.
///
/// ```rust
/// # use longform::{ContentRequest, MultipartOptions, Strategy};
/// let request = ContentRequest::multishot("Episode 3 script", "Write the script.")
///     .multipart(MultipartOptions::new().max_turns(4));
/// assert_eq!(request.strategy, Strategy::Multishot);
/// ```
#[derive(Debug, Clone)]
pub struct ContentRequest {
    /// Friendly task name, used in the file name.
    pub prefix: String,
    pub strategy: Strategy,
    pub prompt: String,
    pub options: ChatOptions,
    pub multipart: MultipartOptions,
}

impl ContentRequest {
    pub fn new(prefix: impl Into<String>, strategy: Strategy, prompt: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            strategy,
            prompt: prompt.into(),
            options: ChatOptions::default(),
            multipart: MultipartOptions::default(),
        }
    }

    pub fn oneshot(prefix: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(prefix, Strategy::Oneshot, prompt)
    }

    pub fn multishot(prefix: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(prefix, Strategy::Multishot, prompt)
    }

    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn multipart(mut self, multipart: MultipartOptions) -> Self {
        self.multipart = multipart;
        self
    }

    /// Derive the cache key for this request.
    pub fn key(&self) -> Result<CacheKey> {
        CacheKey::new(&self.prefix, self.strategy, &self.prompt)
    }
}

/// Generate-once cache in front of a [`ModelGateway`].
#[derive(Clone)]
pub struct ContentCache {
    backend: Arc<dyn CacheBackend>,
}

impl ContentCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    /// Cache backed by an existing directory.
    pub fn on_disk(dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::new(Arc::new(DiskCache::new(dir)?)))
    }

    /// Cache held in process memory.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    /// Return the stored text for the request, generating and storing it
    /// on a miss.
    ///
    /// Key and path validation happen before the gateway is touched.
    /// Gateway errors propagate unchanged and nothing is stored; calling
    /// again re-checks the cache first.
    pub async fn get_or_generate(
        &self,
        gateway: &dyn ModelGateway,
        request: &ContentRequest,
    ) -> Result<String> {
        let key = request.key()?;
        let strategy = key.strategy().as_str();

        if let Some(text) = self.backend.get(&key)? {
            debug!(key = %key, "content cache hit");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "strategy" => strategy).increment(1);
            return Ok(text);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "strategy" => strategy).increment(1);
        info!(key = %key, "content cache miss, generating");

        let text = match request.strategy {
            Strategy::Oneshot => complete(gateway, &request.prompt, &request.options).await?,
            Strategy::Multishot => {
                complete_multipart(
                    gateway,
                    &request.prompt,
                    &request.multipart,
                    &request.options,
                )
                .await?
            }
        };
        let text = text.trim_end().to_string();

        self.backend.put(&key, &text)?;
        Ok(text)
    }
}
