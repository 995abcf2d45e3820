//! Ollama API client.

use ollama_stream_types::{ChatRequest, ClientError, GenerateRequest, ModelDescriptor};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Response};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{log_status, map_reqwest_error};
use crate::mapping::parse_model_list;
use crate::streaming::{ChunkStream, stream_chunks};

/// Client for an Ollama-compatible server.
///
/// Holds no per-request state: every call is independent, and `chat` must be
/// given the full history each time. Cloning is cheap and shares the
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use ollama_stream::{ChatMessage, ChatRequest, ClientConfig, Ollama, ResponseAccumulator};
///
/// # async fn run() -> Result<(), ollama_stream::ClientError> {
/// let client = Ollama::new(ClientConfig::new("http://localhost:11434"))?;
/// let request = ChatRequest::new("llama3.2", vec![ChatMessage::user("Hello!")]);
///
/// let mut stream = client.chat(&request).await?;
/// let mut reply = ResponseAccumulator::new();
/// while let Some(chunk) = stream.next().await {
///     reply.apply(&chunk?);
/// }
/// println!("{}", reply.message().content);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Ollama {
    /// Base URL without a trailing slash.
    host: String,
    /// Bearer token, if configured.
    api_key: Option<String>,
    /// Shared HTTP client.
    client: reqwest::Client,
}

impl Ollama {
    /// Create a client from `config`.
    ///
    /// Fails with [`ClientError::Config`] if the host is missing, blank, or not
    /// a URL. Performs no network activity.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client that sends requests through `client`.
    ///
    /// Use this to set timeouts, proxies, or TLS options; the streaming core
    /// itself never times out.
    pub fn with_http_client(
        config: ClientConfig,
        client: reqwest::Client,
    ) -> Result<Self, ClientError> {
        let config = config.validate()?;
        Ok(Self {
            host: config.host,
            api_key: config.api_key,
            client,
        })
    }

    /// The normalized base URL.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Whether requests carry an `Authorization` header.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.host)
    }

    /// Send a request to `host + path`.
    ///
    /// The body is serialized as JSON for non-GET methods. The status code is
    /// not interpreted here; the body is left to the caller.
    async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ClientError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path);
        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        if let Some(body) = body.filter(|_| method != Method::GET) {
            builder = builder.json(body);
        }

        tracing::debug!(method = %method, url = %url, "sending request");

        let response = builder.send().await.map_err(map_reqwest_error)?;
        log_status(response.status(), &url);
        Ok(response)
    }

    /// List the models available on the server (`GET /api/tags`).
    pub async fn list(&self) -> Result<Vec<ModelDescriptor>, ClientError> {
        let response = self
            .request(Method::GET, "/api/tags", None::<&()>)
            .await?;
        let body = response.text().await.map_err(map_reqwest_error)?;
        let models = parse_model_list(&body)?;
        tracing::debug!(count = models.len(), "listed models");
        Ok(models)
    }

    /// Stream a completion for a single prompt (`POST /api/generate`).
    pub async fn generate(&self, request: &GenerateRequest) -> Result<ChunkStream, ClientError> {
        tracing::debug!(model = %request.model, "starting generate stream");
        let response = self
            .request(Method::POST, "/api/generate", Some(request))
            .await?;
        Ok(stream_chunks(response))
    }

    /// Stream the next assistant message for a conversation (`POST /api/chat`).
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChunkStream, ClientError> {
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "starting chat stream"
        );
        let response = self
            .request(Method::POST, "/api/chat", Some(request))
            .await?;
        Ok(stream_chunks(response))
    }
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("host", &self.host)
            .field("has_api_key", &self.has_api_key())
            .finish_non_exhaustive()
    }
}
