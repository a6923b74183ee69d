//! Conversation messages and the append-only conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged text turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            timestamp: Some(Utc::now()),
        }
    }
}

/// Ordered conversation history.
///
/// Turns are only ever appended; they are never reordered or removed. The one
/// targeted mutation is [`Conversation::amend_last_assistant`], which lets the
/// reflection pass rewrite the text of the most recent assistant turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn to the end of the log.
    pub fn push(&mut self, message: ChatMessage) {
        self.turns.push(message);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.turns.last()
    }

    /// View the turns as a slice, in insertion order.
    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.turns.iter()
    }

    /// Content of the most recent assistant turn.
    pub fn last_assistant(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// The most recent user/assistant exchange: the last assistant turn and
    /// the closest user turn before it.
    pub fn last_exchange(&self) -> Option<(&str, &str)> {
        let assistant_idx = self
            .turns
            .iter()
            .rposition(|m| m.role == Role::Assistant)?;
        let user = self.turns[..assistant_idx]
            .iter()
            .rev()
            .find(|m| m.role == Role::User)?;
        Some((
            user.content.as_str(),
            self.turns[assistant_idx].content.as_str(),
        ))
    }

    /// Replace the text of the most recent assistant turn.
    ///
    /// Returns false when no assistant turn exists.
    pub fn amend_last_assistant(&mut self, text: impl Into<String>) -> bool {
        match self
            .turns
            .iter_mut()
            .rev()
            .find(|m| m.role == Role::Assistant)
        {
            Some(turn) => {
                turn.content = text.into();
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ChatMessage;
    type IntoIter = std::slice::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
