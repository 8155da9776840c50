//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `longform_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `gateway`: gateway name (e.g. "openai")
//! - `operation`: endpoint invoked ("chat", "speech")
//! - `status`: outcome: "ok" or "error"
//! - `strategy`: cache strategy: "oneshot" or "multishot"

/// Total requests sent to the remote service.
///
/// Labels: `gateway`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "longform_requests_total";

/// Request duration in seconds.
///
/// Labels: `gateway`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "longform_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `gateway`, `operation`.
pub const RETRIES_TOTAL: &str = "longform_retries_total";

/// Total tokens consumed.
///
/// Labels: `gateway`, `direction` ("prompt" | "completion").
pub const TOKENS_TOTAL: &str = "longform_tokens_total";

/// Total content cache hits.
///
/// Labels: `strategy`.
pub const CACHE_HITS_TOTAL: &str = "longform_cache_hits_total";

/// Total content cache misses.
///
/// Labels: `strategy`.
pub const CACHE_MISSES_TOTAL: &str = "longform_cache_misses_total";

/// Total assistant turns received by the multipart driver.
pub const MULTIPART_COMPLETIONS_TOTAL: &str = "longform_multipart_completions_total";

/// Multipart runs that hit their turn quota without a termination marker.
pub const QUOTA_EXHAUSTED_TOTAL: &str = "longform_quota_exhausted_total";
