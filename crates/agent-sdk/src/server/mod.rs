//! HTTP surface exposed by an agent process.
//!
//! Three routes: `GET /health` (liveness), `GET /` (discovery
//! descriptor), and `POST /invoke` which validates the request, builds
//! the invocation context from body plus headers, and relays the
//! agent's event stream as a chunked `text/event-stream` response.

mod error;

pub use error::{ApiError, ApiResult, ErrorResponse};

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, Response, StatusCode},
    routing::{get, post},
};
use futures::{Stream, StreamExt, future};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::agent::Agent;
use crate::models::{HeaderOverrides, HealthResponse, InvokeContext, InvokeRequest};

/// State shared across handlers: the hosted agent.
#[derive(Clone)]
pub struct AppState {
    agent: Arc<dyn Agent>,
}

/// Create the application router for an agent.
///
/// Built once per process from the agent's static configuration; no
/// lazy construction or hidden caching.
pub fn router(agent: Arc<dyn Agent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(describe))
        .route("/invoke", post(invoke))
        .with_state(AppState { agent })
}

/// Bind and serve an agent until the process is stopped.
pub async fn serve(agent: Arc<dyn Agent>, addr: SocketAddr) -> anyhow::Result<()> {
    let name = agent.config().name.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(agent)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Agent '{}' listening on {}", name, addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Liveness snapshot of the agent's static configuration.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.agent.health())
}

/// Discovery descriptor: identity, version, capabilities, route map.
async fn describe(State(state): State<AppState>) -> Json<Value> {
    let config = state.agent.config();
    Json(json!({
        "agent_id": config.agent_id.clone(),
        "name": config.name.clone(),
        "version": config.version.clone(),
        "capabilities": config.capabilities.clone(),
        "endpoints": {
            "/health": "Health check (GET)",
            "/invoke": "Agent invocation (POST)",
        },
    }))
}

/// Invoke the agent and stream its events back to the caller.
///
/// Validation failures reject before any stream byte is written. Once
/// streaming starts, events are forwarded in emission order with no
/// buffering; dropping the connection drops the body stream, which
/// stops driving the agent.
async fn invoke(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<InvokeRequest>, JsonRejection>,
) -> ApiResult<Response<Body>> {
    let Json(request) = body
        .map_err(|rejection| ApiError::bad_request(format!("invalid invoke request: {}", rejection.body_text())))?;

    let overrides = HeaderOverrides::from_headers(&headers);
    let ctx = InvokeContext::from_request(request, overrides);
    info!(
        agent_id = %ctx.agent_id,
        session_id = %ctx.session_id,
        run_id = %ctx.run_id,
        "invoking agent"
    );

    let agent_id = ctx.agent_id.clone();
    let events = state.agent.invoke(ctx).await;
    build_sse_response(watch_terminal(events, agent_id))
}

/// Flag events emitted after a terminal event as an agent bug.
///
/// The contract forbids them; they are forwarded unmodified (the
/// dispatcher never reorders or drops) but logged so misbehaving agent
/// code is visible instead of silently tolerated.
fn watch_terminal(
    events: impl Stream<Item = String> + Send + 'static,
    agent_id: String,
) -> impl Stream<Item = String> + Send + 'static {
    events.scan(false, move |terminal_seen, event| {
        if *terminal_seen {
            warn!(
                agent_id = %agent_id,
                "agent emitted an event after its terminal event; this is a bug in the agent"
            );
        }
        if event.starts_with("event: done") || event.starts_with("event: error") {
            *terminal_seen = true;
        }
        future::ready(Some(event))
    })
}

/// Build a chunked SSE response from an event stream.
fn build_sse_response(
    events: impl Stream<Item = String> + Send + 'static,
) -> ApiResult<Response<Body>> {
    let body = Body::from_stream(events.map(|event| Ok::<_, Infallible>(Bytes::from(event))));

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .header("Connection", "keep-alive")
        .header("X-Accel-Buffering", "no") // Disable nginx buffering if present
        .body(body)
        .map_err(|e| ApiError::internal(format!("failed to build SSE response: {}", e)))
}
