#![deny(missing_docs)]
//! Data model for the `ollama-stream` client.
//!
//! Holds the wire types exchanged with an Ollama-compatible server
//! ([`ChatMessage`], [`ModelDescriptor`], [`StreamChunk`], and the request
//! bodies), the [`ClientError`] taxonomy, and the caller-side pieces that turn
//! a sequence of chunks into a finished message ([`accumulate`],
//! [`ResponseAccumulator`], [`Conversation`]).
//!
//! Nothing in this crate performs I/O.

pub mod accumulate;
pub mod conversation;
pub mod error;
pub mod types;

pub use accumulate::*;
pub use conversation::*;
pub use error::*;
pub use types::*;
