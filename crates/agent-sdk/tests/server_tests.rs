//! Integration tests for the agent HTTP surface.

use std::sync::Arc;

use agent_sdk::{AgentConfig, FunctionAgent, SseEmitter, server};
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use futures::stream;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Agent that echoes the run id it observed, so tests can verify what
/// the context builder resolved.
fn test_app() -> Router {
    let agent = FunctionAgent::new(
        AgentConfig::new("demo", "Demo Agent")
            .with_version("0.1.0")
            .with_capabilities(vec!["streaming".to_string()]),
        |ctx| {
            let emitter = SseEmitter::new(Some(ctx.run_id.clone()));
            let delta = emitter.delta(&format!("run={}", ctx.run_id));
            let done = emitter.done(Some(format!("session={}", ctx.session_id)), None);
            Box::pin(stream::iter(vec![delta, done]))
        },
    );
    server::router(Arc::new(agent))
}

fn invoke_body() -> String {
    json!({
        "agent_id": "demo",
        "session_id": "s1",
        "run_id": "r1",
        "input_message": {"role": "user", "content": "hello"},
    })
    .to_string()
}

async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], "0.1.0");
    assert_eq!(json["capabilities"][0], "streaming");
}

#[tokio::test]
async fn test_root_descriptor() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/")
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(json["agent_id"], "demo");
    assert_eq!(json["name"], "Demo Agent");
    assert!(json["endpoints"]["/invoke"].is_string());
    assert!(json["endpoints"]["/health"].is_string());
}

#[tokio::test]
async fn test_invoke_streams_events() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/invoke")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(invoke_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    assert_eq!(response.headers().get(header::CACHE_CONTROL).unwrap(), "no-cache");
    assert_eq!(response.headers().get("x-accel-buffering").unwrap(), "no");

    let body = body_string(response.into_body()).await;
    assert!(body.contains("event: delta\n"));
    assert!(body.contains("run=r1"));
    // The byte stream ends with the terminal done event.
    let last_event = body.trim_end().rsplit("\n\n").next().unwrap();
    assert!(last_event.starts_with("event: done"));
}

#[tokio::test]
async fn test_invoke_header_overrides_body() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/invoke")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-run-id", "r2")
                .header("x-session-id", "s2")
                .body(Body::from(invoke_body()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response.into_body()).await;
    // The agent observed the header values, not the body values.
    assert!(body.contains("run=r2"));
    assert!(!body.contains("run=r1"));
    assert!(body.contains("session=s2"));
}

#[tokio::test]
async fn test_invoke_malformed_role_rejected_before_stream() {
    let body = json!({
        "agent_id": "demo",
        "session_id": "s1",
        "run_id": "r1",
        "input_message": {"role": "narrator", "content": "hello"},
    })
    .to_string();

    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/invoke")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // Structured error body, not a partial event stream.
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"));
    let json: Value = serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("invalid invoke request"));
}

#[tokio::test]
async fn test_invoke_missing_fields_rejected() {
    let response = test_app()
        .oneshot(
            Request::builder()
                .uri("/invoke")
                .method(Method::POST)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"agent_id":"demo"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
