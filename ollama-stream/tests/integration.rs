//! Integration tests for the Ollama client using wiremock.

use futures::StreamExt;
use ollama_stream::{
    ChatMessage, ChatRequest, ChunkOutcome, ClientConfig, ClientError, GenerateRequest,
    ModelOptions, Ollama, ResponseAccumulator, StreamChunk, StreamState,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Ollama {
    Ollama::new(ClientConfig::new(server.uri())).expect("valid config")
}

fn chat_request() -> ChatRequest {
    ChatRequest::new(
        "llama3.2",
        vec![
            ChatMessage::system("Be brief."),
            ChatMessage::user("Hello"),
        ],
    )
}

async fn collect(client: &Ollama, request: &ChatRequest) -> Vec<Result<StreamChunk, ClientError>> {
    client
        .chat(request)
        .await
        .expect("request should be sent")
        .collect()
        .await
}

// ─── list ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [{"model": "m1", "name": "Model One"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = client_for(&server).list().await.expect("should succeed");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].model, "m1");
    assert_eq!(models[0].name, "Model One");
}

#[tokio::test]
async fn list_without_models_field_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"tags": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).list().await.unwrap_err();
    assert!(matches!(err, ClientError::Api(_)), "expected Api, got: {err:?}");
}

#[tokio::test]
async fn list_with_html_error_page_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).list().await.unwrap_err();
    assert!(matches!(err, ClientError::Api(_)), "expected Api, got: {err:?}");
}

// ─── headers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn no_authorization_header_without_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"done\":true}\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.list().await.expect("list");
    collect(&client, &chat_request()).await;

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert!(
            request.headers.get("authorization").is_none(),
            "unexpected Authorization header on {}",
            request.url
        );
        assert_eq!(
            request
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }
}

#[tokio::test]
async fn api_key_is_sent_as_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        Ollama::new(ClientConfig::new(server.uri()).api_key("secret-token")).expect("config");
    client.list().await.expect("should match bearer header");
}

#[tokio::test]
async fn get_request_has_no_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .mount(&server)
        .await;

    client_for(&server).list().await.expect("list");

    let requests = server.received_requests().await.expect("recording enabled");
    assert!(requests[0].body.is_empty());
}

// ─── chat ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_posts_full_history() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(serde_json::json!({
            "model": "llama3.2",
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"done\":true}\n"))
        .expect(1)
        .mount(&server)
        .await;

    let results = collect(&client_for(&server), &chat_request()).await;
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn chat_stream_accumulates_content() {
    let server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"message":{"role":"assistant","content":"A"}}"#,
        "\n",
        r#"{"message":{"role":"assistant","content":"B"},"done":true}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .mount(&server)
        .await;

    let results = collect(&client_for(&server), &chat_request()).await;
    assert_eq!(results.len(), 2);

    let mut reply = ResponseAccumulator::new();
    for result in &results {
        reply.apply(result.as_ref().expect("chunk"));
    }
    assert_eq!(reply.state(), &StreamState::Complete);
    assert_eq!(reply.message().content, "AB");
}

#[tokio::test]
async fn chat_in_band_error_ends_stream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            r#"{"error":"overloaded"}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":"ignored"},"done":true}"#,
            "\n",
        )))
        .mount(&server)
        .await;

    let results = collect(&client_for(&server), &chat_request()).await;
    assert_eq!(results.len(), 1);
    let chunk = results[0].as_ref().expect("chunk");
    assert_eq!(chunk.outcome(), ChunkOutcome::Failed("overloaded"));
}

#[tokio::test]
async fn chat_error_status_with_json_body_is_in_band_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":"model 'nope' not found"}"#),
        )
        .mount(&server)
        .await;

    let results = collect(&client_for(&server), &chat_request()).await;
    assert_eq!(results.len(), 1);
    let chunk = results[0].as_ref().expect("chunk");
    assert_eq!(chunk.error.as_deref(), Some("model 'nope' not found"));
}

#[tokio::test]
async fn chat_without_terminal_chunk_is_incomplete() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            r#"{"message":{"role":"assistant","content":"cut"}}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":" off"}}"#,
        )))
        .mount(&server)
        .await;

    let results = collect(&client_for(&server), &chat_request()).await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[1].as_ref().expect("chunk").content(), " off");
    assert!(matches!(results[2], Err(ClientError::IncompleteStream)));
}

#[tokio::test]
async fn chat_with_invalid_line_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"response\":\"a\"}\n{oops\n"))
        .mount(&server)
        .await;

    let results = collect(&client_for(&server), &chat_request()).await;
    assert_eq!(results.len(), 2);
    assert!(matches!(results[1], Err(ClientError::Decode(_))));
}

#[tokio::test]
async fn chat_passes_options_through() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_json(serde_json::json!({
            "model": "llama3.2",
            "messages": [{"role": "user", "content": "Hi"}],
            "options": {"temperature": 0.5, "num_predict": 64},
            "keep_alive": "5m",
            "think": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"done\":true}\n"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest::new("llama3.2", vec![ChatMessage::user("Hi")])
        .options(ModelOptions {
            temperature: Some(0.5),
            num_predict: Some(64),
            ..Default::default()
        })
        .keep_alive("5m")
        .extra("think", serde_json::json!(false));

    let results = collect(&client_for(&server), &request).await;
    assert!(results[0].is_ok());
}

#[tokio::test]
async fn dropping_stream_early_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            r#"{"message":{"role":"assistant","content":"first"}}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":"second"},"done":true}"#,
            "\n",
        )))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut stream = client.chat(&chat_request()).await.expect("sent");
    let first = stream.next().await.expect("one chunk").expect("ok");
    assert_eq!(first.content(), "first");
    drop(stream);

    // The client remains usable after an abandoned stream.
    let results = collect(&client, &chat_request()).await;
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn concurrent_chats_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string(concat!(
            r#"{"message":{"role":"assistant","content":"x"}}"#,
            "\n",
            r#"{"message":{"role":"assistant","content":"y"},"done":true}"#,
            "\n",
        )))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = chat_request();
    let (a, b) = tokio::join!(collect(&client, &request), collect(&client, &request));

    for results in [a, b] {
        let text: String = results
            .iter()
            .map(|r| r.as_ref().expect("chunk").content())
            .collect();
        assert_eq!(text, "xy");
    }
}

// ─── generate ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_streams_response_fields() {
    let server = MockServer::start().await;

    let ndjson_body = concat!(
        r#"{"model":"llama3.2","response":"The sky","done":false}"#,
        "\n",
        r#"{"model":"llama3.2","response":" is blue.","done":false}"#,
        "\n",
        r#"{"model":"llama3.2","response":"","done":true,"done_reason":"stop","eval_count":4,"prompt_eval_count":9}"#,
        "\n",
    );

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_json(serde_json::json!({
            "model": "llama3.2",
            "prompt": "Why is the sky blue?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(ndjson_body))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerateRequest::new("llama3.2", "Why is the sky blue?");
    let mut stream = client_for(&server)
        .generate(&request)
        .await
        .expect("request should be sent");

    let mut reply = ResponseAccumulator::new();
    while let Some(chunk) = stream.next().await {
        reply.apply(&chunk.expect("chunk"));
    }

    assert_eq!(reply.state(), &StreamState::Complete);
    assert_eq!(reply.message().content, "The sky is blue.");
    let last = reply.final_chunk().expect("terminal chunk");
    assert_eq!(last.prompt_eval_count, Some(9));
    assert_eq!(last.done_reason.as_deref(), Some("stop"));
}

// ─── transport ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    // Reserve a port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let client = Ollama::new(ClientConfig::new(format!("http://{addr}"))).expect("config");
    let err = client.list().await.unwrap_err();
    assert!(err.is_transport(), "expected Transport, got: {err:?}");

    let Err(err) = client.chat(&chat_request()).await else {
        panic!("chat against a closed port should fail");
    };
    assert!(err.is_transport(), "expected Transport, got: {err:?}");
}
