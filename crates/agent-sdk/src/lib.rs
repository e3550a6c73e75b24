//! Agent SDK for the multi-agent platform.
//!
//! Build an agent by implementing [`Agent`] (or wrapping a handler in
//! [`FunctionAgent`]), then expose it over HTTP with [`server::serve`].
//! The server answers `GET /health`, `GET /`, and `POST /invoke`,
//! streaming the agent's SSE events back to the platform. From inside
//! an invocation, [`PlatformClient`] calls outward to the
//! orchestrator's LLM proxy, tools, peer agents, and session store.
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_sdk::{AgentConfig, FunctionAgent, server, sse::stream_text};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let agent = FunctionAgent::new(AgentConfig::new("echo", "Echo Agent"), |ctx| {
//!         stream_text(ctx.input_message.content, Some(ctx.run_id), 10, 50)
//!     });
//!     server::serve(Arc::new(agent), "0.0.0.0:8000".parse()?).await
//! }
//! ```

pub mod agent;
pub mod client;
pub mod models;
pub mod server;
pub mod sse;

pub use agent::{Agent, AgentConfig, EventStream, FunctionAgent};
pub use client::{
    AgentRelayClient, AgentStreamEvent, LlmClient, PlatformClient, PlatformError, PlatformResult,
    SessionClient, ToolClient, ToolResult, ToolStatus,
};
pub use models::{
    AgentInfo, DeltaEvent, DoneEvent, ErrorEvent, HeaderOverrides, HealthResponse, InvokeContext,
    InvokeRequest, Message, Role, StateEvent, Usage,
};
pub use sse::{SseEmitter, SseEventType, format_sse_event};
