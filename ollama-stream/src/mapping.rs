//! Response-body mapping for the non-streaming endpoints.
//!
//! Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md#list-local-models>

use ollama_stream_types::{ClientError, ModelDescriptor};

/// Parse a `GET /api/tags` body into its `models` list.
///
/// Fails with [`ClientError::Api`] when the body is not JSON, has no `models`
/// field, or `models` is not a list of descriptors.
pub fn parse_model_list(body: &str) -> Result<Vec<ModelDescriptor>, ClientError> {
    let mut json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ClientError::Api(format!("model list is not valid JSON: {e}")))?;

    let models = json
        .get_mut("models")
        .map(serde_json::Value::take)
        .ok_or_else(|| ClientError::Api(format!("model list has no `models` field: {body}")))?;

    serde_json::from_value(models)
        .map_err(|e| ClientError::Api(format!("malformed `models` entry: {e}")))
}
