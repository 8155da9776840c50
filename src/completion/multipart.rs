//! Multipart conversation driver.
//!
//! Services cap the length of a single response. The driver asks for a long
//! answer in parts: it sends the conversation so far, records the reply,
//! and either stops on a termination marker or asks for the next part with
//! a continuation prompt. A turn quota bounds the number of calls.
//!
//! Exhausting the quota is not an error: the partial conversation is
//! returned with [`MultipartOutcome::quota_exhausted`] set, and callers
//! should treat the reassembled text as valid but possibly incomplete.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::reassemble::reassemble;
use super::termination::detect;
use super::trimmed_content;
use crate::telemetry;
use crate::types::{ChatOptions, Conversation, Message};
use crate::{LongformError, ModelGateway, Result};

/// Default maximum number of assistant turns per multipart run.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Notice appended to the initial prompt when
/// [`MultipartOptions::announce_continuation`] is set.
pub const CONTINUATION_NOTICE: &str = "The response may be long, so provide it in multiple parts. \
Stop each part at a natural break; you will then be asked to continue. \
After the final part, on a new line, write: Done";

/// Prompt sent after each non-terminal part unless overridden.
pub const DEFAULT_CONTINUATION_PROMPT: &str = "Continue with the next part. \
If the response is already complete, reply with only: Done";

/// Options controlling a multipart run.
///
/// ```rust
/// # use longform::MultipartOptions;
/// let options = MultipartOptions::new()
///     .max_turns(5)
///     .announce_continuation(true);
/// assert_eq!(options.max_turns, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipartOptions {
    /// Maximum number of assistant turns. Default: 10.
    pub max_turns: usize,
    /// Continuation prompt; `None` uses [`DEFAULT_CONTINUATION_PROMPT`].
    pub continuation: Option<String>,
    /// Append [`CONTINUATION_NOTICE`] to the initial prompt. Leave unset
    /// when the prompt already explains the multipart protocol.
    pub announce_continuation: bool,
}

impl Default for MultipartOptions {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            continuation: None,
            announce_continuation: false,
        }
    }
}

impl MultipartOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_turns(mut self, n: usize) -> Self {
        self.max_turns = n;
        self
    }

    pub fn continuation(mut self, prompt: impl Into<String>) -> Self {
        self.continuation = Some(prompt.into());
        self
    }

    pub fn announce_continuation(mut self, announce: bool) -> Self {
        self.announce_continuation = announce;
        self
    }

    fn continuation_prompt(&self) -> &str {
        self.continuation
            .as_deref()
            .unwrap_or(DEFAULT_CONTINUATION_PROMPT)
    }
}

/// Result of a multipart run.
#[derive(Debug, Clone)]
pub struct MultipartOutcome {
    /// Every exchanged turn, starting with the seed prompt.
    pub conversation: Conversation,
    /// Number of assistant turns received.
    pub completions: usize,
    /// The quota ran out before a termination marker was seen.
    pub quota_exhausted: bool,
}

impl MultipartOutcome {
    /// Join the assistant turns into one text.
    pub fn text(&self) -> String {
        reassemble(&self.conversation)
    }
}

/// Drive a multipart exchange until termination or quota exhaustion.
///
/// Gateway errors propagate unchanged; no call is retried here.
pub async fn run_multipart(
    gateway: &dyn ModelGateway,
    prompt: &str,
    multipart: &MultipartOptions,
    options: &ChatOptions,
) -> Result<MultipartOutcome> {
    let max_turns = multipart.max_turns;
    if max_turns == 0 {
        return Err(LongformError::InvalidInput(
            "max_turns must be at least 1".to_string(),
        ));
    }

    let prompt = if multipart.announce_continuation {
        format!("{prompt}\n\n{CONTINUATION_NOTICE}")
    } else {
        prompt.to_string()
    };
    let prompt_len = prompt.len();
    let mut conversation = Conversation::new(prompt);

    for completion in 1..=max_turns {
        info!(completion, prompt_len, "requesting multipart completion");
        let response = gateway.chat(conversation.turns(), options).await?;
        let content = trimmed_content(response)?;
        metrics::counter!(telemetry::MULTIPART_COMPLETIONS_TOTAL).increment(1);

        let terminal = detect(&content).is_terminal();
        conversation.push(Message::assistant(content));

        if terminal {
            info!(completion, "multipart completion terminated");
            return Ok(MultipartOutcome {
                conversation,
                completions: completion,
                quota_exhausted: false,
            });
        }

        if completion == max_turns {
            warn!(
                max_turns,
                prompt_len, "multipart quota exhausted without termination marker"
            );
            metrics::counter!(telemetry::QUOTA_EXHAUSTED_TOTAL).increment(1);
            return Ok(MultipartOutcome {
                conversation,
                completions: completion,
                quota_exhausted: true,
            });
        }

        conversation.push(Message::user(multipart.continuation_prompt()));
    }

    unreachable!("loop returns on its final iteration")
}

/// Run a multipart exchange and reassemble it into one text.
pub async fn complete_multipart(
    gateway: &dyn ModelGateway,
    prompt: &str,
    multipart: &MultipartOptions,
    options: &ChatOptions,
) -> Result<String> {
    let outcome = run_multipart(gateway, prompt, multipart, options).await?;
    Ok(outcome.text())
}
