//! Public types for the Longform API.

mod message;
mod options;
mod response;
mod speech;

pub use message::{Conversation, Message, Role};
pub use options::ChatOptions;
pub use response::{ChatResponse, FinishReason, Usage};
pub use speech::{MAX_SPEECH_INPUT_CHARS, SpeechRequest};
