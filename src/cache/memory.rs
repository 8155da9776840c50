//! In-process cache backend.

use super::{CacheBackend, CacheKey};
use crate::Result;

/// Thread-safe in-memory store of generated texts.
///
/// Keyed on [`CacheKey::file_name`], so it addresses entries exactly like
/// [`DiskCache`](super::DiskCache). Entries are never evicted or expired.
/// Useful for tests and for callers that only need deduplication within
/// one process.
pub struct MemoryCache {
    entries: moka::sync::Cache<String, String>,
}

impl MemoryCache {
    /// Create an empty, unbounded cache.
    pub fn new() -> Self {
        Self {
            entries: moka::sync::Cache::builder().build(),
        }
    }

    /// Number of entries currently in the cache.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        Ok(self.entries.get(&key.file_name()))
    }

    fn put(&self, key: &CacheKey, text: &str) -> Result<()> {
        self.entries
            .insert(key.file_name(), text.trim_end().to_string());
        Ok(())
    }
}
