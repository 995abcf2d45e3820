//! Append-only chat history.

use crate::accumulate::accumulate;
use crate::types::{ChatMessage, Role, StreamChunk};

/// Ordered, append-only chat history.
///
/// Messages are never reordered or removed. While a reply streams in, the last
/// message is the only one that changes, and only by appending text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Create an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a system message.
    pub fn push_system(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::system(content));
    }

    /// Append a user message.
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::user(content));
    }

    /// Append an empty assistant message to stream a reply into.
    pub fn begin_reply(&mut self) {
        self.push(ChatMessage::new(Role::Assistant, ""));
    }

    /// Fold a chunk into the last message. No-op on an empty conversation.
    pub fn apply_chunk(&mut self, chunk: &StreamChunk) {
        if let Some(last) = self.messages.last_mut() {
            let role = last.role;
            let prior = std::mem::replace(last, ChatMessage::new(role, ""));
            *last = accumulate(prior, chunk);
        }
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<ChatMessage>> for Conversation {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}
