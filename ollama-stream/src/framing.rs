//! Line framing for NDJSON response bodies.
//!
//! Network reads split the body at arbitrary byte offsets: a JSON record can
//! straddle two chunks, one chunk can hold several records, and a multi-byte
//! UTF-8 character can be cut in half. [`frame_lines`] keeps a pending byte
//! buffer across reads and yields one `String` per `\n`-terminated line.

use futures::{Stream, StreamExt};
use ollama_stream_types::ClientError;

/// Split a byte stream into lines.
///
/// Each yielded line has its trailing `\n` (and a `\r` before it) removed.
/// Empty lines are yielded as empty strings. When the source ends, any
/// unterminated remainder is yielded as a final line.
///
/// A failing read yields [`ClientError::Transport`]; a line that is not valid
/// UTF-8 yields [`ClientError::Decode`]. Either ends the stream.
///
/// The returned stream is lazy: the source is pulled only when the consumer
/// asks for a line that is not already buffered.
pub fn frame_lines<S, B, E>(source: S) -> impl Stream<Item = Result<String, ClientError>> + Send + 'static
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + Send + 'static,
{
    async_stream::stream! {
        let mut source = std::pin::pin!(source);
        let mut pending: Vec<u8> = Vec::new();

        while let Some(chunk_result) = source.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(ClientError::Transport(e.into()));
                    return;
                }
            };
            let bytes = chunk.as_ref();
            if bytes.is_empty() {
                continue;
            }

            // Bytes already in `pending` hold no newline, so only scan the new ones.
            let mut scan_from = pending.len();
            pending.extend_from_slice(bytes);
            let mut line_start = 0;

            while let Some(offset) = memchr::memchr(b'\n', &pending[scan_from..]) {
                let newline = scan_from + offset;
                let line = decode_line(&pending[line_start..newline]);
                line_start = newline + 1;
                scan_from = line_start;

                match line {
                    Ok(line) => {
                        tracing::trace!(len = line.len(), "framed line");
                        yield Ok(line);
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            pending.drain(..line_start);
        }

        if !pending.is_empty() {
            yield decode_line(&pending);
        }
    }
}

fn decode_line(bytes: &[u8]) -> Result<String, ClientError> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ClientError::Decode(format!("invalid UTF-8 in response line: {e}")))
}
