//! Connection settings for [`Ollama`](crate::Ollama).

use ollama_stream_types::ClientError;
use serde::Deserialize;

/// Default Ollama API base URL, used by [`ClientConfig::from_env`].
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Environment variable holding the server address.
pub const HOST_ENV: &str = "OLLAMA_HOST";

/// Environment variable holding the bearer token.
pub const API_KEY_ENV: &str = "OLLAMA_API_KEY";

/// Server address and optional bearer token.
///
/// Both fields are optional so that configuration can be deserialized from
/// partial sources; [`Ollama::new`](crate::Ollama::new) rejects a config
/// without a host.
#[derive(Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. `http://localhost:11434`.
    #[serde(default)]
    pub host: Option<String>,
    /// Sent as `Authorization: Bearer <api_key>` when set and non-empty.
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,
}

impl ClientConfig {
    /// Config pointing at `host` with no credential.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            api_key: None,
        }
    }

    /// Attach a bearer token.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Read `OLLAMA_HOST` and `OLLAMA_API_KEY` from the process environment.
    ///
    /// Falls back to [`DEFAULT_HOST`]. A host without a scheme
    /// (`127.0.0.1:11434`) gets `http://` prepended.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let host = lookup(HOST_ENV)
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .map(|h| {
                if h.contains("://") {
                    h
                } else {
                    format!("http://{h}")
                }
            })
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        Self {
            host: Some(host),
            api_key: lookup(API_KEY_ENV),
        }
    }

    /// Check the config and normalize it for request building.
    pub(crate) fn validate(self) -> Result<ValidConfig, ClientError> {
        let host = self
            .host
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ClientError::Config("host is required".into()))?;

        reqwest::Url::parse(&host)
            .map_err(|e| ClientError::Config(format!("invalid host {host:?}: {e}")))?;

        Ok(ValidConfig {
            host: host.trim_end_matches('/').to_string(),
            api_key: self.api_key.filter(|k| !k.is_empty()),
        })
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// A config that passed [`ClientConfig::validate`].
#[derive(Clone)]
pub(crate) struct ValidConfig {
    pub(crate) host: String,
    pub(crate) api_key: Option<String>,
}
