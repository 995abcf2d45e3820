//! Caller-side folding of [`StreamChunk`]s into a finished message.
//!
//! [`accumulate`] is the pure reducer. [`ResponseAccumulator`] wraps it with
//! the stream state machine:
//!
//! ```text
//! Pending --first chunk--> Streaming --done--> Complete
//!                              |
//!                              +----error----> Failed
//! ```

use crate::types::{ChatMessage, ChunkOutcome, Role, StreamChunk};

/// Fold one chunk into the message being built.
///
/// Appends the chunk's content fragment. Chunks carrying `error` contribute
/// nothing.
#[must_use]
pub fn accumulate(mut prior: ChatMessage, chunk: &StreamChunk) -> ChatMessage {
    if chunk.error.is_none() {
        prior.push_content(chunk.content());
    }
    prior
}

/// Where a response stream stands from the consumer's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    /// No chunk applied yet.
    Pending,
    /// At least one non-terminal chunk applied.
    Streaming,
    /// A `done` chunk was applied.
    Complete,
    /// An `error` chunk was applied; holds the server's message.
    Failed(String),
}

impl StreamState {
    /// Whether the stream has reached `Complete` or `Failed`.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

/// Builds a reply message from a chunk sequence while tracking [`StreamState`].
///
/// # Example
///
/// ```
/// use ollama_stream_types::{ResponseAccumulator, StreamChunk, StreamState};
///
/// let mut acc = ResponseAccumulator::new();
/// acc.apply(&StreamChunk { response: Some("Hel".into()), ..Default::default() });
/// acc.apply(&StreamChunk { response: Some("lo".into()), done: true, ..Default::default() });
/// assert_eq!(acc.state(), &StreamState::Complete);
/// assert_eq!(acc.message().content, "Hello");
/// ```
#[derive(Debug, Clone)]
pub struct ResponseAccumulator {
    state: StreamState,
    message: ChatMessage,
    final_chunk: Option<StreamChunk>,
}

impl ResponseAccumulator {
    /// Start an empty assistant reply.
    #[must_use]
    pub fn new() -> Self {
        Self::from_message(ChatMessage::new(Role::Assistant, ""))
    }

    /// Continue building on an existing message (e.g. a seeded assistant prefix).
    #[must_use]
    pub fn from_message(message: ChatMessage) -> Self {
        Self {
            state: StreamState::Pending,
            message,
            final_chunk: None,
        }
    }

    /// Apply one chunk and return the resulting state.
    ///
    /// Chunks applied after `Complete` or `Failed` are ignored.
    pub fn apply(&mut self, chunk: &StreamChunk) -> &StreamState {
        if self.state.is_finished() {
            return &self.state;
        }

        let message = std::mem::replace(&mut self.message, ChatMessage::new(Role::Assistant, ""));
        self.message = accumulate(message, chunk);

        self.state = match chunk.outcome() {
            ChunkOutcome::Continue => StreamState::Streaming,
            ChunkOutcome::Complete => StreamState::Complete,
            ChunkOutcome::Failed(reason) => StreamState::Failed(reason.to_string()),
        };
        if self.state.is_finished() {
            self.final_chunk = Some(chunk.clone());
        }
        &self.state
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// The message built so far.
    #[must_use]
    pub fn message(&self) -> &ChatMessage {
        &self.message
    }

    /// The terminal chunk, once one has been applied. Carries usage counters.
    #[must_use]
    pub fn final_chunk(&self) -> Option<&StreamChunk> {
        self.final_chunk.as_ref()
    }

    /// Consume the accumulator, returning the message and final state.
    #[must_use]
    pub fn into_parts(self) -> (ChatMessage, StreamState) {
        (self.message, self.state)
    }
}

impl Default for ResponseAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
