//! Streaming client for Ollama-compatible model servers.
//!
//! Talks to the NDJSON HTTP API (`/api/tags`, `/api/generate`, `/api/chat`)
//! and turns a response body into a lazy stream of decoded chunks without
//! buffering the whole response.
//!
//! # Usage
//!
//! ```no_run
//! use futures::StreamExt;
//! use ollama_stream::{ChatRequest, ClientConfig, Conversation, Ollama};
//!
//! # async fn run() -> Result<(), ollama_stream::ClientError> {
//! let client = Ollama::new(ClientConfig::from_env())?;
//! let models = client.list().await?;
//!
//! let mut conversation = Conversation::new();
//! conversation.push_user("Why is the sky blue?");
//! let request = ChatRequest::new(&models[0].model, conversation.messages().to_vec());
//!
//! conversation.begin_reply();
//! let mut stream = client.chat(&request).await?;
//! while let Some(chunk) = stream.next().await {
//!     conversation.apply_chunk(&chunk?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Layers
//!
//! - [`framing`]: bytes to lines, buffering partial lines across reads
//! - [`streaming`]: lines to [`StreamChunk`]s, ending at the terminal chunk
//! - [`Ollama`]: request building and the three endpoints
//!
//! Folding chunks into a message is left to the caller; see
//! [`ResponseAccumulator`] and [`Conversation`].

pub mod client;
pub mod config;
pub mod error;
pub mod framing;
pub mod mapping;
pub mod streaming;

pub use client::Ollama;
pub use config::ClientConfig;
pub use streaming::ChunkStream;

// Re-export the data model for convenience
pub use ollama_stream_types::*;
