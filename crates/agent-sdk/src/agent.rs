//! The agent contract and its function adapter.
//!
//! Implement [`Agent`] for full control, or wrap a plain handler in
//! [`FunctionAgent`] when no state is needed. Either way `invoke`
//! returns a lazy, ordered, finite stream of wire-ready SSE strings
//! whose last element encodes a `done` or `error` event; nothing may
//! follow the terminal event.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;

use crate::models::{AgentInfo, HealthResponse, InvokeContext};

/// Lazy sequence of wire-ready SSE event strings.
pub type EventStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Static configuration describing an agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique agent identifier.
    pub agent_id: String,
    /// Human-readable name.
    pub name: String,
    /// Agent version string.
    pub version: String,
    /// Capability strings advertised on `/health` and `/`.
    pub capabilities: Vec<String>,
}

impl AgentConfig {
    pub fn new(agent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            name: name.into(),
            version: "0.1.0".to_string(),
            capabilities: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }
}

/// The unit of business logic hosted by the streaming server.
///
/// Implementations choose what to emit and in what order; use
/// [`crate::sse::SseEmitter`] to produce properly framed events.
/// Suspending between elements (outbound calls, typing delays) is fine
/// and never blocks other in-flight invocations.
#[async_trait]
pub trait Agent: Send + Sync + 'static {
    /// Static configuration for this agent.
    fn config(&self) -> &AgentConfig;

    /// Handle one invocation, producing the event stream relayed to
    /// the caller.
    async fn invoke(&self, ctx: InvokeContext) -> EventStream;

    /// Registration record for the orchestrator. The endpoint is
    /// filled in at registration time.
    fn info(&self) -> AgentInfo {
        let config = self.config();
        AgentInfo {
            agent_id: config.agent_id.clone(),
            name: config.name.clone(),
            endpoint: String::new(),
            capabilities: config.capabilities.clone(),
        }
    }

    /// Health snapshot served on `GET /health`.
    fn health(&self) -> HealthResponse {
        let config = self.config();
        HealthResponse {
            status: "healthy".to_string(),
            version: config.version.clone(),
            capabilities: config.capabilities.clone(),
        }
    }
}

type Handler = dyn Fn(InvokeContext) -> EventStream + Send + Sync;

/// Agent built from a plain handler function.
///
/// Adapter only; same contract as [`Agent`], no extra semantics.
pub struct FunctionAgent {
    config: AgentConfig,
    handler: Arc<Handler>,
}

impl FunctionAgent {
    /// Wrap a handler in a configured agent.
    pub fn new<F>(config: AgentConfig, handler: F) -> Self
    where
        F: Fn(InvokeContext) -> EventStream + Send + Sync + 'static,
    {
        Self {
            config,
            handler: Arc::new(handler),
        }
    }
}

#[async_trait]
impl Agent for FunctionAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn invoke(&self, ctx: InvokeContext) -> EventStream {
        (self.handler)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HeaderOverrides, InvokeRequest, Message, Role};
    use crate::sse::stream_text;
    use futures::StreamExt;

    fn test_ctx(input: &str) -> InvokeContext {
        InvokeContext::from_request(
            InvokeRequest {
                agent_id: "echo".to_string(),
                session_id: "s1".to_string(),
                run_id: "r1".to_string(),
                input_message: Message::new(Role::User, input),
                messages: None,
                context: None,
            },
            HeaderOverrides::default(),
        )
    }

    #[tokio::test]
    async fn test_function_agent_passthrough() {
        let agent = FunctionAgent::new(AgentConfig::new("echo", "Echo Agent"), |ctx| {
            stream_text(ctx.input_message.content, Some(ctx.run_id), 10, 0)
        });

        let events: Vec<String> = agent.invoke(test_ctx("hi there")).await.collect().await;
        assert!(events[0].starts_with("event: delta"));
        assert!(events[0].contains("hi there"));
        assert!(events.last().unwrap().starts_with("event: done"));
    }

    #[test]
    fn test_agent_health_snapshot() {
        let config = AgentConfig::new("echo", "Echo Agent")
            .with_version("1.2.3")
            .with_capabilities(vec!["streaming".to_string()]);
        let agent = FunctionAgent::new(config, |_| Box::pin(futures::stream::empty()));

        let health = agent.health();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, "1.2.3");
        assert_eq!(health.capabilities, vec!["streaming".to_string()]);
    }

    #[test]
    fn test_agent_info_endpoint_unset() {
        let agent = FunctionAgent::new(AgentConfig::new("echo", "Echo Agent"), |_| {
            Box::pin(futures::stream::empty())
        });
        let info = agent.info();
        assert_eq!(info.agent_id, "echo");
        assert!(info.endpoint.is_empty());
    }
}
