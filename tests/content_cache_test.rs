//! Tests for the generate-once content cache.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use longform::{
    CacheBackend, CacheKey, ChatOptions, ChatResponse, ContentCache, ContentRequest, DiskCache,
    LongformError, Message, ModelGateway, MultipartOptions, Result, Strategy,
};

/// Answers every call with a numbered reply; multipart runs end after
/// `parts_before_done` parts.
struct CountingGateway {
    calls: AtomicU32,
    parts_before_done: u32,
}

impl CountingGateway {
    fn new() -> Self {
        Self::with_parts(1)
    }

    fn with_parts(parts_before_done: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            parts_before_done,
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ModelGateway for CountingGateway {
    fn name(&self) -> &str {
        "counting"
    }

    async fn chat(&self, messages: &[Message], _options: &ChatOptions) -> Result<ChatResponse> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let completed = messages.iter().filter(|m| m.is_assistant()).count() as u32;
        if completed >= self.parts_before_done {
            return Ok(ChatResponse::text("Done"));
        }
        Ok(ChatResponse::text(format!("reply {n}\n")))
    }
}

struct FailingGateway;

#[async_trait]
impl ModelGateway for FailingGateway {
    fn name(&self) -> &str {
        "failing"
    }

    async fn chat(&self, _messages: &[Message], _options: &ChatOptions) -> Result<ChatResponse> {
        Err(LongformError::Http("connection reset".into()))
    }
}

fn disk_cache() -> (tempfile::TempDir, ContentCache) {
    let dir = tempfile::tempdir().unwrap();
    let cache = ContentCache::on_disk(dir.path()).unwrap();
    (dir, cache)
}

fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

// =========================================================================
// Hits and misses
// =========================================================================

#[tokio::test]
async fn second_request_is_served_from_disk() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::new();
    let request = ContentRequest::oneshot("Greeting", "Say hello.");

    let first = cache.get_or_generate(&gateway, &request).await.unwrap();
    let second = cache.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(first, "reply 1");
    assert_eq!(second, first);
    assert_eq!(gateway.call_count(), 1);

    let key = request.key().unwrap();
    assert_eq!(file_names(dir.path()), [key.file_name()]);
    assert_eq!(
        std::fs::read_to_string(dir.path().join(key.file_name())).unwrap(),
        "reply 1"
    );
}

#[tokio::test]
async fn entries_survive_a_new_cache_instance() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::new();
    let request = ContentRequest::oneshot("Greeting", "Say hello.");
    cache.get_or_generate(&gateway, &request).await.unwrap();

    let reopened = ContentCache::on_disk(dir.path()).unwrap();
    let text = reopened.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(text, "reply 1");
    assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn hand_written_entry_is_returned_verbatim() {
    let (dir, cache) = disk_cache();
    let request = ContentRequest::multishot("Chapter 1", "Write chapter one.");
    let key = request.key().unwrap();
    std::fs::write(dir.path().join(key.file_name()), "Edited by hand.\n").unwrap();

    let gateway = CountingGateway::new();
    let text = cache.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(text, "Edited by hand.");
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn deleting_the_file_forces_regeneration() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::new();
    let request = ContentRequest::oneshot("Greeting", "Say hello.");
    cache.get_or_generate(&gateway, &request).await.unwrap();

    let key = request.key().unwrap();
    std::fs::remove_file(dir.path().join(key.file_name())).unwrap();

    let text = cache.get_or_generate(&gateway, &request).await.unwrap();
    assert_eq!(text, "reply 2");
    assert_eq!(gateway.call_count(), 2);
}

// =========================================================================
// Key sensitivity
// =========================================================================

#[tokio::test]
async fn different_prompts_use_different_entries() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::new();

    cache
        .get_or_generate(&gateway, &ContentRequest::oneshot("Task", "prompt A"))
        .await
        .unwrap();
    cache
        .get_or_generate(&gateway, &ContentRequest::oneshot("Task", "prompt B"))
        .await
        .unwrap();

    assert_eq!(gateway.call_count(), 2);
    assert_eq!(file_names(dir.path()).len(), 2);
}

#[tokio::test]
async fn strategy_is_part_of_the_key() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::new();

    cache
        .get_or_generate(&gateway, &ContentRequest::oneshot("Task", "prompt"))
        .await
        .unwrap();
    cache
        .get_or_generate(&gateway, &ContentRequest::multishot("Task", "prompt"))
        .await
        .unwrap();

    let names = file_names(dir.path());
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|n| n.contains("(oneshot)")));
    assert!(names.iter().any(|n| n.contains("(multishot)")));
}

#[tokio::test]
async fn chat_options_do_not_affect_the_key() {
    let (_dir, cache) = disk_cache();
    let gateway = CountingGateway::new();

    cache
        .get_or_generate(&gateway, &ContentRequest::oneshot("Task", "prompt"))
        .await
        .unwrap();
    let text = cache
        .get_or_generate(
            &gateway,
            &ContentRequest::oneshot("Task", "prompt")
                .options(ChatOptions::default().model("other-model").temperature(0.2)),
        )
        .await
        .unwrap();

    assert_eq!(text, "reply 1");
    assert_eq!(gateway.call_count(), 1);
}

// =========================================================================
// Multishot
// =========================================================================

#[tokio::test]
async fn multishot_stores_reassembled_text() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::with_parts(2);
    let request = ContentRequest::multishot("Story", "Tell a story.");

    let text = cache.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(text, "reply 1\n\nreply 2");
    assert_eq!(gateway.call_count(), 3);
    let key = request.key().unwrap();
    assert_eq!(
        std::fs::read_to_string(dir.path().join(key.file_name())).unwrap(),
        "reply 1\n\nreply 2"
    );
}

#[tokio::test]
async fn multishot_quota_exhaustion_is_still_cached() {
    let (_dir, cache) = disk_cache();
    let gateway = CountingGateway::with_parts(u32::MAX);
    let request = ContentRequest::multishot("Story", "Tell a story.")
        .multipart(MultipartOptions::new().max_turns(2));

    let text = cache.get_or_generate(&gateway, &request).await.unwrap();
    let again = cache.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(text, "reply 1\n\nreply 2");
    assert_eq!(again, text);
    assert_eq!(gateway.call_count(), 2);
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn unusable_prefix_fails_before_calling_gateway() {
    let (dir, cache) = disk_cache();
    let gateway = CountingGateway::new();

    let err = cache
        .get_or_generate(&gateway, &ContentRequest::oneshot("///", "prompt"))
        .await
        .unwrap_err();

    assert!(matches!(err, LongformError::InvalidKey(_)));
    assert_eq!(gateway.call_count(), 0);
    assert!(file_names(dir.path()).is_empty());
}

#[tokio::test]
async fn overlong_prefix_fails_before_calling_gateway() {
    let (_dir, cache) = disk_cache();
    let gateway = CountingGateway::new();

    let err = cache
        .get_or_generate(&gateway, &ContentRequest::oneshot("x".repeat(400), "prompt"))
        .await
        .unwrap_err();

    assert!(matches!(err, LongformError::InvalidPath(_)));
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn missing_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let result = ContentCache::on_disk(dir.path().join("nope"));
    assert!(matches!(result, Err(LongformError::InvalidPath(_))));
}

#[tokio::test]
async fn gateway_failure_stores_nothing() {
    let (dir, cache) = disk_cache();
    let request = ContentRequest::oneshot("Greeting", "Say hello.");

    let err = cache
        .get_or_generate(&FailingGateway, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, LongformError::Http(_)));
    assert!(file_names(dir.path()).is_empty());

    let gateway = CountingGateway::new();
    let text = cache.get_or_generate(&gateway, &request).await.unwrap();
    assert_eq!(text, "reply 1");
}

// =========================================================================
// Concurrency
// =========================================================================

/// Two caches on the same directory that both miss each call the gateway;
/// the later write is what remains on disk.
#[tokio::test]
async fn racing_writers_last_write_wins() {
    let dir = tempfile::tempdir().unwrap();
    let a = DiskCache::new(dir.path()).unwrap();
    let b = DiskCache::new(dir.path()).unwrap();
    let key = CacheKey::new("Race", Strategy::Oneshot, "prompt").unwrap();

    assert!(a.get(&key).unwrap().is_none());
    assert!(b.get(&key).unwrap().is_none());

    a.put(&key, "from a").unwrap();
    b.put(&key, "from b").unwrap();

    assert_eq!(a.get(&key).unwrap().as_deref(), Some("from b"));
    assert_eq!(file_names(dir.path()), [key.file_name()]);
}

// =========================================================================
// Memory backend
// =========================================================================

#[tokio::test]
async fn memory_cache_deduplicates_within_process() {
    let cache = ContentCache::in_memory();
    let gateway = CountingGateway::new();
    let request = ContentRequest::oneshot("Greeting", "Say hello.");

    let first = cache.get_or_generate(&gateway, &request).await.unwrap();
    let second = cache.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn cloned_cache_shares_backend() {
    let cache = ContentCache::in_memory();
    let clone = cache.clone();
    let gateway = CountingGateway::new();
    let request = ContentRequest::oneshot("Greeting", "Say hello.");

    cache.get_or_generate(&gateway, &request).await.unwrap();
    clone.get_or_generate(&gateway, &request).await.unwrap();

    assert_eq!(gateway.call_count(), 1);
}
