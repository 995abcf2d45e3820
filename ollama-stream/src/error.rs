//! Internal helpers for mapping reqwest failures to [`ClientError`].

use ollama_stream_types::ClientError;

/// Map a [`reqwest::Error`] to a [`ClientError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        tracing::debug!("request timed out");
    }
    ClientError::Transport(Box::new(err))
}

/// Log a non-success status. The body is still decoded: Ollama reports most
/// failures as `{"error": "..."}`, which callers see as an in-band error chunk.
pub(crate) fn log_status(status: reqwest::StatusCode, url: &str) {
    if !status.is_success() {
        tracing::warn!(url = %url, status = %status, "server returned non-success status");
    }
}
