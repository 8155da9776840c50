//! Message types for multipart conversations

use serde::{Deserialize, Serialize};

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn exchanged with the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Ordered turns of one multipart exchange.
///
/// Always starts with a user turn. Turns appended through [`push`](Self::push)
/// must alternate roles; the driver relies on this to keep the request
/// history well-formed for the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with the initial user prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Message::user(prompt)],
        }
    }

    /// Build a conversation from pre-existing turns.
    ///
    /// Returns `None` when the turns are empty, do not start with a user
    /// turn, or do not alternate.
    pub fn from_turns(turns: Vec<Message>) -> Option<Self> {
        let alternating = turns.iter().enumerate().all(|(i, m)| {
            let expected = if i % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            m.role == expected
        });
        (!turns.is_empty() && alternating).then_some(Self { turns })
    }

    /// Append a turn.
    ///
    /// # Panics
    ///
    /// Panics if the turn has the same role as the previous one.
    pub fn push(&mut self, message: Message) {
        let last = self.turns.last().map(|m| m.role);
        assert_ne!(
            last,
            Some(message.role),
            "conversation turns must alternate between user and assistant"
        );
        self.turns.push(message);
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<Message> {
        self.turns
    }

    /// Assistant turns in order.
    pub fn assistant_turns(&self) -> impl Iterator<Item = &Message> {
        self.turns.iter().filter(|m| m.is_assistant())
    }

    pub fn last(&self) -> Option<&Message> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_seeds_single_user_turn() {
        let conversation = Conversation::new("hello");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0], Message::user("hello"));
    }

    #[test]
    fn from_turns_rejects_leading_assistant() {
        assert!(Conversation::from_turns(vec![Message::assistant("hi")]).is_none());
        assert!(Conversation::from_turns(vec![]).is_none());
    }

    #[test]
    fn from_turns_rejects_repeated_roles() {
        let turns = vec![Message::user("a"), Message::user("b")];
        assert!(Conversation::from_turns(turns).is_none());
    }

    #[test]
    #[should_panic(expected = "must alternate")]
    fn push_same_role_panics() {
        let mut conversation = Conversation::new("a");
        conversation.push(Message::user("b"));
    }

    #[test]
    fn assistant_turns_filters_in_order() {
        let mut conversation = Conversation::new("q");
        conversation.push(Message::assistant("one"));
        conversation.push(Message::user("more"));
        conversation.push(Message::assistant("two"));
        let texts: Vec<_> = conversation
            .assistant_turns()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(texts, ["one", "two"]);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }
}
