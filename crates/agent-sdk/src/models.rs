//! Wire-level data models for platform/agent communication.

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Header carrying a session-id override for `/invoke`.
pub const HEADER_SESSION_ID: &str = "x-session-id";
/// Header carrying a run-id override for `/invoke`.
pub const HEADER_RUN_ID: &str = "x-run-id";
/// W3C trace propagation header.
pub const HEADER_TRACEPARENT: &str = "traceparent";
/// Header telling the agent where to reach the orchestrator.
pub const HEADER_PLATFORM_BASE_URL: &str = "x-platform-base-url";

/// Message role in a conversation.
///
/// This is a closed set; unrecognized roles fail deserialization
/// instead of being coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            _ => Err(format!("unknown message role: {}", s)),
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body for the `/invoke` endpoint.
///
/// This is what the platform sends to an agent when invoking it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// ID of the agent being invoked.
    pub agent_id: String,
    /// Session identifier.
    pub session_id: String,
    /// Run identifier for this execution.
    pub run_id: String,
    /// The user's input message.
    pub input_message: Message,
    /// Full conversation history (transcript), if the platform sent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    /// Additional context (user_id, timezone, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

/// Transport headers recognized on `/invoke`.
///
/// `session_id`/`run_id` override the same-named body fields when
/// present; `traceparent` and `platform_base_url` have no body
/// equivalent and come only from here.
#[derive(Debug, Clone, Default)]
pub struct HeaderOverrides {
    pub session_id: Option<String>,
    pub run_id: Option<String>,
    pub traceparent: Option<String>,
    pub platform_base_url: Option<String>,
}

impl HeaderOverrides {
    /// Extract the recognized headers from a request header map.
    ///
    /// Values that are not valid UTF-8 are treated as absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        Self {
            session_id: get(HEADER_SESSION_ID),
            run_id: get(HEADER_RUN_ID),
            traceparent: get(HEADER_TRACEPARENT),
            platform_base_url: get(HEADER_PLATFORM_BASE_URL),
        }
    }
}

/// Canonical per-invocation context handed to the agent.
///
/// Combines the request body with the recognized transport headers,
/// with header values taking precedence over body values. Built once,
/// before the agent runs.
#[derive(Debug, Clone)]
pub struct InvokeContext {
    pub agent_id: String,
    pub session_id: String,
    pub run_id: String,
    pub input_message: Message,
    /// Transcript; empty when the request carried none.
    pub messages: Vec<Message>,
    /// Additional context; empty when the request carried none.
    pub context: Map<String, Value>,
    /// Distributed-trace propagation id, header only.
    pub traceparent: Option<String>,
    /// Orchestrator base URL, header only.
    pub platform_base_url: Option<String>,
}

impl InvokeContext {
    /// Build the context from a validated request plus headers.
    ///
    /// Total for any well-formed [`InvokeRequest`]; never fails.
    pub fn from_request(request: InvokeRequest, overrides: HeaderOverrides) -> Self {
        Self {
            agent_id: request.agent_id,
            session_id: overrides.session_id.unwrap_or(request.session_id),
            run_id: overrides.run_id.unwrap_or(request.run_id),
            input_message: request.input_message,
            messages: request.messages.unwrap_or_default(),
            context: request.context.unwrap_or_default(),
            traceparent: overrides.traceparent,
            platform_base_url: overrides.platform_base_url,
        }
    }
}

/// Response for the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub capabilities: Vec<String>,
}

/// Token usage statistics.
///
/// All counters are advisory; nothing checks that `tokens` equals
/// `prompt_tokens + completion_tokens`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Payload of a `delta` (streaming text) event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeltaEvent {
    /// Text chunk; may be empty.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

/// Payload of a `state` change event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEvent {
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Map<String, Value>>,
}

/// Payload of a terminal `done` event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoneEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Payload of a terminal `error` event. Both fields are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub code: String,
    pub message: String,
}

/// Registration record submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: String,
    pub name: String,
    /// Agent HTTP endpoint URL.
    pub endpoint: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}
