//! Longform - multipart LLM completions with a content-addressed cache
//!
//! Services cap the length of a single response. This crate asks for long
//! answers in parts, detects when the model signals it is done, joins the
//! parts, and keeps every generated text on disk so identical requests are
//! paid for once.
//!
//! # Example
//!
//! ```rust,no_run
//! use longform::{ContentCache, ContentRequest, EnvCredential, Longform, MultipartOptions};
//!
//! #[tokio::main]
//! async fn main() -> longform::Result<()> {
//!     let gateway = Longform::builder()
//!         .credentials(EnvCredential::new().with_dotenv())
//!         .build()?;
//!
//!     let cache = ContentCache::on_disk("./cache")?;
//!     let request = ContentRequest::multishot(
//!         "History of tea",
//!         "Write a detailed history of tea.",
//!     )
//!     .multipart(MultipartOptions::new().announce_continuation(true));
//!
//!     let text = gateway.cached_content(&cache, &request).await?;
//!     println!("{text}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod completion;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod speech;
pub mod telemetry;
pub mod traits;
pub mod types;

// Re-export main types at crate root
pub use cache::{
    CacheBackend, CacheKey, ContentCache, ContentRequest, DiskCache, MemoryCache, Strategy,
};
pub use completion::{
    MultipartOptions, MultipartOutcome, TERMINATION_MARKERS, Termination, complete,
    complete_multipart, detect, reassemble, run_multipart,
};
pub use config::GatewayConfig;
pub use credentials::{CredentialProvider, EnvCredential, StaticCredential};
pub use error::{LongformError, Result};
pub use gateway::{Gateway, Longform, LongformBuilder};
pub use providers::{OpenAiGateway, RetryConfig, RetryingGateway};
pub use speech::write_speech;
pub use traits::ModelGateway;

pub use types::{
    ChatOptions, ChatResponse, Conversation, FinishReason, Message, Role, SpeechRequest, Usage,
};
