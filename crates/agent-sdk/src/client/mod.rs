//! Platform client for agents to call back into the orchestrator.
//!
//! Sub-clients cover the orchestrator's sub-APIs: LLM proxy, tool
//! invocation, agent-to-agent calls, and session history. All of them
//! share one HTTP client and surface failures as [`PlatformError`];
//! no component here retries automatically.

mod agents;
mod llm;
mod sessions;
mod tools;

pub use agents::{AgentRelayClient, AgentStreamEvent};
pub use llm::LlmClient;
pub use sessions::SessionClient;
pub use tools::{ToolClient, ToolResult, ToolStatus};

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt, future};
use serde_json::Value;
use thiserror::Error;

use crate::models::AgentInfo;

/// Default HTTP timeout for platform calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Typed error for all outbound platform calls.
///
/// Transport failures are never converted into a fabricated
/// [`ToolResult`] or a partial stream element; they surface as this
/// type with a stable code.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The orchestrator answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never completed (connection refused, reset, DNS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response or stream chunk was not valid JSON.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The caller-supplied time budget ran out at the HTTP layer.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl PlatformError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Http { .. } => "HTTP_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
        }
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Shared transport state behind every sub-client.
pub(crate) struct PlatformInner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) run_id: String,
}

impl PlatformInner {
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`PlatformError::Http`], keeping
    /// the response body as the message.
    pub(crate) async fn ensure_success(
        &self,
        response: reqwest::Response,
    ) -> PlatformResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.text().await {
            Ok(body) if !body.is_empty() => body,
            _ => status.to_string(),
        };
        Err(PlatformError::Http {
            status: status.as_u16(),
            message,
        })
    }
}

/// End a fallible stream at its first error.
///
/// Decode and transport failures abort the in-progress sequence;
/// elements already yielded stand.
pub(crate) fn stop_after_error<T, S>(stream: S) -> impl Stream<Item = PlatformResult<T>>
where
    S: Stream<Item = PlatformResult<T>>,
{
    stream.scan(false, |errored, item| {
        if *errored {
            return future::ready(None);
        }
        *errored = item.is_err();
        future::ready(Some(item))
    })
}

/// Main client for interacting with the platform from an agent.
///
/// Usually constructed inside `Agent::invoke` from the context's
/// `platform_base_url` and `run_id`.
pub struct PlatformClient {
    inner: Arc<PlatformInner>,
    /// LLM proxy (OpenAI-compatible) sub-client.
    pub llm: LlmClient,
    /// Tool invocation sub-client.
    pub tools: ToolClient,
    /// Agent-to-agent call sub-client.
    pub agents: AgentRelayClient,
    /// Session history sub-client.
    pub sessions: SessionClient,
}

impl PlatformClient {
    /// Create a client with the default timeout.
    pub fn new(base_url: impl Into<String>, run_id: impl Into<String>) -> PlatformResult<Self> {
        Self::with_timeout(base_url, run_id, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit HTTP timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        run_id: impl Into<String>,
        timeout: Duration,
    ) -> PlatformResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let inner = Arc::new(PlatformInner {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            run_id: run_id.into(),
        });

        Ok(Self {
            llm: LlmClient::new(Arc::clone(&inner)),
            tools: ToolClient::new(Arc::clone(&inner)),
            agents: AgentRelayClient::new(Arc::clone(&inner)),
            sessions: SessionClient::new(Arc::clone(&inner)),
            inner,
        })
    }

    /// The run id this client stamps on outbound calls.
    pub fn run_id(&self) -> &str {
        &self.inner.run_id
    }

    /// Register an agent with the platform.
    pub async fn register_agent(&self, info: &AgentInfo) -> PlatformResult<Value> {
        let response = self
            .inner
            .http
            .post(self.inner.url("/v1/agents/register"))
            .json(info)
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PlatformError::Http {
                status: 502,
                message: "bad gateway".to_string()
            }
            .code(),
            "HTTP_ERROR"
        );
        assert_eq!(PlatformError::Transport(String::new()).code(), "TRANSPORT_ERROR");
        assert_eq!(PlatformError::Decode(String::new()).code(), "DECODE_ERROR");
        assert_eq!(PlatformError::Timeout(String::new()).code(), "TIMEOUT");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = PlatformClient::new("http://orchestrator:8080/", "r1").unwrap();
        assert_eq!(client.inner.url("/v1/agents"), "http://orchestrator:8080/v1/agents");
    }

    #[tokio::test]
    async fn test_stop_after_error_truncates() {
        let items: Vec<PlatformResult<u32>> = vec![
            Ok(1),
            Err(PlatformError::Decode("bad json".to_string())),
            Ok(2),
        ];
        let out: Vec<PlatformResult<u32>> = stop_after_error(stream::iter(items)).collect().await;
        assert_eq!(out.len(), 2);
        assert_eq!(*out[0].as_ref().unwrap(), 1);
        assert!(out[1].is_err());
    }
}
