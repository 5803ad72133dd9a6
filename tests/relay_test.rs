use std::sync::Arc;
use std::time::Duration;

use concierge::consts::{EMPTY_COMPLETION_PLACEHOLDER, STUDIO_CONTEXT};
use concierge::provider::chat::{ChatCompletionProvider, ChatProviderConfig};
use concierge::relay::{FailureKind, QueryRequest, Relay};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper: a relay whose primary provider points at the stub server.
fn relay_for(server: &MockServer) -> Relay {
    let provider = ChatCompletionProvider::new(ChatProviderConfig {
        name: "primary".to_string(),
        base_url: format!("{}/v1", server.uri()),
        model: "llama-3.3-70b-versatile".to_string(),
        api_key: "gsk-test".to_string(),
        temperature: Some(0.7),
        max_tokens: Some(1024),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    Relay::new(Some(Arc::new(provider)))
}

fn completion(content: &str) -> Value {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
}

// ── Success ───────────────────────────────────────────────────────

#[tokio::test]
async fn forwards_query_with_bearer_and_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({
            "model": "llama-3.3-70b-versatile",
            "max_tokens": 1024,
            "messages": [
                { "role": "system", "content": STUDIO_CONTEXT },
                { "role": "user", "content": "tell me about kitchen design" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Kitchens are...")))
        .expect(1)
        .mount(&server)
        .await;

    let answer = relay_for(&server)
        .relay(&QueryRequest::new("tell me about kitchen design"))
        .await
        .unwrap();

    assert_eq!(answer.text, "Kitchens are...");
    assert_eq!(answer.provider, "primary");
}

#[tokio::test]
async fn sends_moderate_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&server)
        .await;

    relay_for(&server)
        .relay(&QueryRequest::new("hello"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn empty_choices_yield_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = relay_for(&server)
        .relay(&QueryRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(answer.text, EMPTY_COMPLETION_PLACEHOLDER);
}

// ── Failures ──────────────────────────────────────────────────────

#[tokio::test]
async fn upstream_429_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(1)
        .mount(&server)
        .await;

    let err = relay_for(&server)
        .relay(&QueryRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::RateLimited);
}

#[tokio::test]
async fn upstream_500_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = relay_for(&server)
        .relay(&QueryRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::UpstreamError);
}

#[tokio::test]
async fn malformed_body_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = relay_for(&server)
        .relay(&QueryRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::UpstreamError);
}

#[tokio::test]
async fn blank_query_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("nope")))
        .expect(0)
        .mount(&server)
        .await;

    let err = relay_for(&server)
        .relay(&QueryRequest::new("   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidInput);
}
