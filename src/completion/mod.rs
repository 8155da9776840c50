//! Completion strategies over a [`ModelGateway`].
//!
//! - [`complete`]: one request, one reply.
//! - [`multipart::run_multipart`] / [`multipart::complete_multipart`]: a
//!   bounded sequence of continuation turns, terminated by a marker
//!   ([`termination`]) and joined by [`reassemble::reassemble`].

pub mod multipart;
pub mod reassemble;
pub mod termination;

pub use multipart::{
    MultipartOptions, MultipartOutcome, complete_multipart, run_multipart,
};
pub use reassemble::reassemble;
pub use termination::{TERMINATION_MARKERS, Termination, detect};

use tracing::info;

use crate::types::{ChatOptions, ChatResponse, Message};
use crate::{LongformError, ModelGateway, Result};

/// Request a single completion for the prompt and return its trimmed text.
pub async fn complete(
    gateway: &dyn ModelGateway,
    prompt: &str,
    options: &ChatOptions,
) -> Result<String> {
    info!(prompt_len = prompt.len(), "requesting completion");
    let response = gateway.chat(&[Message::user(prompt)], options).await?;
    trimmed_content(response)
}

/// Trim a reply, rejecting replies with no text.
pub(crate) fn trimmed_content(response: ChatResponse) -> Result<String> {
    let content = response.content.trim();
    if content.is_empty() {
        return Err(LongformError::EmptyResponse);
    }
    Ok(content.to_string())
}
