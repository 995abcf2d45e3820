//! Error type shared by every `ollama-stream` operation.

/// Errors from client construction, requests, and stream consumption.
///
/// A server-reported failure carried in a chunk's `error` field is *not* a
/// `ClientError`; it arrives as an ordinary terminal
/// [`StreamChunk`](crate::StreamChunk).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Missing or invalid client configuration. Raised before any network activity.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Network-level failure while sending a request or reading a body.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// A framed line is not valid UTF-8 or not a valid JSON record.
    #[error("decode error: {0}")]
    Decode(String),
    /// A well-formed response body is missing expected fields.
    #[error("unexpected API response: {0}")]
    Api(String),
    /// The byte stream ended before a `done` or `error` chunk arrived.
    #[error("stream ended without a terminal chunk")]
    IncompleteStream,
}

impl ClientError {
    /// Whether this error came from the network rather than from the protocol.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
