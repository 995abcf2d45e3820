//! NDJSON decoding for the `/api/generate` and `/api/chat` response streams.
//!
//! Each framed line is one JSON object:
//! ```text
//! {"model":"llama3.2","message":{"role":"assistant","content":"Hello"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":" world"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop"}
//! ```
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#generate-a-chat-completion>

use std::pin::Pin;

use futures::{Stream, StreamExt};
use ollama_stream_types::{ChunkOutcome, ClientError, StreamChunk};
use reqwest::Response;

use crate::framing::frame_lines;

/// A lazy, single-pass sequence of decoded response chunks.
///
/// Ends right after the first terminal chunk (`done` or `error`). Ends with
/// [`ClientError::IncompleteStream`] if the body runs out before one arrives,
/// and with the first [`ClientError`] hit while reading or decoding.
///
/// Dropping the stream drops the underlying response body, which releases the
/// connection.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ClientError>> + Send>>;

/// Wrap an HTTP response body into a [`ChunkStream`].
pub(crate) fn stream_chunks(response: Response) -> ChunkStream {
    Box::pin(parse_ndjson_stream(response.bytes_stream()))
}

/// Decode a raw byte stream into [`StreamChunk`]s.
///
/// Blank lines are skipped. A line that is not a JSON object yields
/// [`ClientError::Decode`] and ends the stream with no attempt to resynchronize.
/// After a terminal chunk the source is not pulled again.
pub fn parse_ndjson_stream<S, B, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<StreamChunk, ClientError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    async_stream::stream! {
        let mut lines = std::pin::pin!(frame_lines(byte_stream));

        while let Some(line_result) = lines.next().await {
            let line = match line_result {
                Ok(line) => line,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let chunk = match decode_chunk(&line) {
                Ok(chunk) => chunk,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping stream after undecodable line");
                    yield Err(e);
                    return;
                }
            };

            match chunk.outcome() {
                ChunkOutcome::Continue => {}
                ChunkOutcome::Complete => {
                    tracing::debug!(
                        done_reason = chunk.done_reason.as_deref().unwrap_or("unknown"),
                        eval_count = chunk.eval_count.unwrap_or(0),
                        "stream complete"
                    );
                }
                ChunkOutcome::Failed(reason) => {
                    tracing::debug!(error = %reason, "server reported an error in-band");
                }
            }

            let terminal = chunk.is_terminal();
            yield Ok(chunk);
            if terminal {
                return;
            }
        }

        yield Err(ClientError::IncompleteStream);
    }
}

fn decode_chunk(line: &str) -> Result<StreamChunk, ClientError> {
    serde_json::from_str(line)
        .map_err(|e| ClientError::Decode(format!("JSON parse error in NDJSON: {e}")))
}
