//! Joining multipart assistant turns into one text.

use super::termination::{is_marker, residue};
use crate::types::Conversation;

/// Paragraph separator placed between consecutive parts.
pub const PART_SEPARATOR: &str = "\n\n";

/// Join the assistant turns of a conversation into one text.
///
/// Trailing termination markers are stripped; a turn consisting only of a
/// marker contributes nothing. Parts are joined with a blank line and the
/// result is right-trimmed.
///
/// # Panics
///
/// Panics if a marker-only turn is not the last turn of the conversation.
/// The driver always stops on such a turn, so this indicates a corrupted
/// conversation rather than a caller error.
pub fn reassemble(conversation: &Conversation) -> String {
    let turns = conversation.turns();
    let mut parts = Vec::new();

    for (index, message) in turns.iter().enumerate() {
        if !message.is_assistant() {
            continue;
        }
        let text = message.content.trim();
        if is_marker(text) {
            assert_eq!(
                index + 1,
                turns.len(),
                "termination marker at turn {} of {}: {:?}",
                index + 1,
                turns.len(),
                turns
            );
            break;
        }
        parts.push(residue(text));
    }

    parts.join(PART_SEPARATOR).trim_end().to_string()
}
