//! HTTP API Tests
//!
//! Health check, call flow, call initiation and webhook endpoints, driven
//! through the router with `oneshot`. The telephony REST API is mocked with
//! wiremock.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use callbridge_gateway::{ServerConfig, routes, state::AppState};

fn base_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 8000;
    config.server_domain = Some("bridge.example.com".to_string());
    config.agent_websocket_url = "wss://agent.example.com/v1/convai/conversation".to_string();
    config
}

async fn app_with(config: ServerConfig) -> (Router, Arc<AppState>) {
    let state = AppState::new(config).await.unwrap();
    (routes::create_app(state.clone()), state)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn call_request() -> Value {
    json!({"from_number": "+14155550100", "to_number": "+918035735800"})
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app_with(base_config()).await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"status": "OK"}));
}

#[tokio::test]
async fn test_call_flow_descriptor() {
    let mut config = base_config();
    config.agent_sample_rate = "8k".to_string();
    let (app, _) = app_with(config).await;

    let (status, body) = post_json(
        app,
        "/api/v1/calls/flow",
        json!({
            "call_id": "call-1",
            "account_id": "acct-1",
            "from_number": "+14155550100",
            "to_number": "+918035735800"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "action": "stream",
            "ws_url": "wss://bridge.example.com/api/v1/calls/media-stream",
            "chunk_size": 500,
            "sample_rate": "8k",
            "record": true
        })
    );
}

#[tokio::test]
async fn test_initiate_call_success() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/calls/initiate"))
        .and(header("X-API-KEY", "teler-test-key"))
        .and(body_partial_json(json!({
            "from_number": "+14155550100",
            "to_number": "+918035735800",
            "flow_url": "https://bridge.example.com/api/v1/calls/flow",
            "status_callback_url": "https://bridge.example.com/api/v1/webhooks/receiver",
            "record": true
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"id": "c0ffee", "status": "queued"}})),
        )
        .expect(1)
        .mount(&provider)
        .await;

    let mut config = base_config();
    config.teler_api_key = Some("teler-test-key".to_string());
    config.teler_api_url = provider.uri();
    let (app, _) = app_with(config).await;

    let (status, body) = post_json(app, "/api/v1/calls/initiate-call", call_request()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "call_id": "c0ffee"}));
}

#[tokio::test]
async fn test_initiate_call_provider_failure() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/calls/initiate"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "bad key"})))
        .mount(&provider)
        .await;

    let mut config = base_config();
    config.teler_api_key = Some("wrong".to_string());
    config.teler_api_url = provider.uri();
    let (app, _) = app_with(config).await;

    let (status, body) = post_json(app, "/api/v1/calls/initiate-call", call_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to create call."}));
}

#[tokio::test]
async fn test_initiate_call_without_api_key_makes_no_request() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "never"})))
        .expect(0)
        .mount(&provider)
        .await;

    let mut config = base_config();
    config.teler_api_key = None;
    config.teler_api_url = provider.uri();
    let (app, _) = app_with(config).await;

    let (status, body) = post_json(app, "/api/v1/calls/initiate-call", call_request()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to create call."}));
}

#[tokio::test]
async fn test_initiate_call_rejects_invalid_numbers() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "never"})))
        .expect(0)
        .mount(&provider)
        .await;

    let mut config = base_config();
    config.teler_api_key = Some("teler-test-key".to_string());
    config.teler_api_url = provider.uri();
    let (app, _) = app_with(config).await;

    let (status, body) = post_json(
        app,
        "/api/v1/calls/initiate-call",
        json!({"from_number": "+14155550100", "to_number": "call me maybe"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("to_number"));
}

#[tokio::test]
async fn test_webhook_receiver_acknowledges() {
    let (app, _) = app_with(base_config()).await;

    let (status, body) = post_json(
        app,
        "/api/v1/webhooks/receiver",
        json!({"event": "call.completed", "data": {"call_id": "c0ffee", "duration": 42}}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"received": true}));
}

#[tokio::test]
async fn test_media_stream_requires_upgrade() {
    let (app, state) = app_with(base_config()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/calls/media-stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(state.ws_connection_count(), 0);
}
