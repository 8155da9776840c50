//! Gateway implementations and decorators.

pub mod openai;
pub mod retry;

pub use openai::OpenAiGateway;
pub use retry::{RetryConfig, RetryingGateway};
