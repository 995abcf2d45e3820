//! Wire types for the `/api/tags`, `/api/generate`, and `/api/chat` endpoints.
//!
//! Streaming responses arrive as NDJSON, one [`StreamChunk`] per line:
//! ```text
//! {"model":"llama3.2","message":{"role":"assistant","content":"Hel"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":"lo"},"done":false}
//! {"model":"llama3.2","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","eval_count":2}
//! ```
//! `/api/generate` chunks carry `response` in place of `message.content`.

use serde::{Deserialize, Serialize};

/// The role of a message participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// A human user.
    User,
    /// The model.
    Assistant,
}

/// A single role-tagged message in a chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// Message text. Grows only by appending while a reply streams in.
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role and content.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Append a streamed fragment to the content.
    pub fn push_content(&mut self, fragment: &str) {
        self.content.push_str(fragment);
    }
}

/// A model entry from `GET /api/tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Identifier to pass as `model` in requests.
    pub model: String,
    /// Display label.
    pub name: String,
    /// Last modification timestamp as reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Size on disk in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Content digest of the model blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// How a chunk affects the stream it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome<'a> {
    /// More chunks follow.
    Continue,
    /// Final chunk of a successful response.
    Complete,
    /// Server-reported failure; the stream ends here.
    Failed(&'a str),
}

/// One decoded NDJSON record from `/api/generate` or `/api/chat`.
///
/// Every field is optional on the wire. A record with neither content nor a
/// terminal marker is accepted and contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamChunk {
    /// Model that produced the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Server timestamp for the chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Message fragment (`/api/chat`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    /// Text fragment (`/api/generate`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Set on the final chunk of a successful response.
    #[serde(default)]
    pub done: bool,
    /// Why generation stopped (e.g. "stop", "length").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    /// Server-reported failure. Terminates the stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Total time spent on the request in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Time spent loading the model in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Number of prompt tokens evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Time spent evaluating the prompt in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,
    /// Number of tokens generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
    /// Time spent generating in nanoseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

impl StreamChunk {
    /// The text fragment carried by this chunk, or `""` if there is none.
    #[must_use]
    pub fn content(&self) -> &str {
        match (&self.message, &self.response) {
            (Some(message), _) => message.content.as_str(),
            (None, Some(response)) => response.as_str(),
            (None, None) => "",
        }
    }

    /// Classify the chunk. `error` wins over `done` if a server sends both.
    #[must_use]
    pub fn outcome(&self) -> ChunkOutcome<'_> {
        match (&self.error, self.done) {
            (Some(error), _) => ChunkOutcome::Failed(error.as_str()),
            (None, true) => ChunkOutcome::Complete,
            (None, false) => ChunkOutcome::Continue,
        }
    }

    /// Whether this chunk ends its stream.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self.outcome(), ChunkOutcome::Continue)
    }
}

/// Sampling and runtime options forwarded verbatim as `options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
    /// Context window size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u32>,
    /// Nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Random seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Stop sequences.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

/// Body for `POST /api/chat`.
///
/// The server keeps no session; `messages` must hold the full history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered conversation history.
    pub messages: Vec<ChatMessage>,
    /// Output format constraint (`"json"` or a JSON schema).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    /// Sampling options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
    /// How long the server keeps the model loaded (e.g. "5m").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Additional top-level fields passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    /// Create a chat request for `model` over `messages`.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            format: None,
            options: None,
            keep_alive: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set sampling options.
    #[must_use]
    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the output format constraint.
    #[must_use]
    pub fn format(mut self, format: serde_json::Value) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the keep-alive duration.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Add a passthrough top-level field.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// Body for `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    /// Model identifier.
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// System prompt overriding the model's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Output format constraint (`"json"` or a JSON schema).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
    /// Sampling options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
    /// How long the server keeps the model loaded (e.g. "5m").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
    /// Additional top-level fields passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GenerateRequest {
    /// Create a generate request for `model` with a single prompt.
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            format: None,
            options: None,
            keep_alive: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the system prompt.
    #[must_use]
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set sampling options.
    #[must_use]
    pub fn options(mut self, options: ModelOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the output format constraint.
    #[must_use]
    pub fn format(mut self, format: serde_json::Value) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the keep-alive duration.
    #[must_use]
    pub fn keep_alive(mut self, duration: impl Into<String>) -> Self {
        self.keep_alive = Some(duration.into());
        self
    }

    /// Add a passthrough top-level field.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}
