//! Tool invocation sub-client.
//!
//! The orchestrator owns authoritative tool-call state; this client
//! only creates calls and observes their status. A call starts out
//! `pending` (approval-gated) or already terminal; terminal states
//! never transition again.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{PlatformInner, PlatformResult};

/// Extra transport allowance on top of the server-side wait budget so
/// the HTTP deadline does not fire before the orchestrator answers.
const WAIT_GRACE: Duration = Duration::from_millis(5_000);

/// Default per-call budget in milliseconds.
pub const DEFAULT_TOOL_TIMEOUT_MS: u64 = 60_000;

/// Status of a tool call as reported by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Succeeded,
    Pending,
    Failed,
}

impl ToolStatus {
    /// Whether this status is final.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ToolStatus::Succeeded | ToolStatus::Failed)
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStatus::Succeeded => write!(f, "succeeded"),
            ToolStatus::Pending => write!(f, "pending"),
            ToolStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a tool invocation or status poll.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub status: ToolStatus,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ToolResult {
    pub fn succeeded(&self) -> bool {
        self.status == ToolStatus::Succeeded
    }

    pub fn pending(&self) -> bool {
        self.status == ToolStatus::Pending
    }

    pub fn failed(&self) -> bool {
        self.status == ToolStatus::Failed
    }
}

/// Client for invoking tools through the platform.
///
/// The platform handles tool routing, approval workflows, and client
/// tool delegation; none of that is visible here beyond the `pending`
/// status.
pub struct ToolClient {
    inner: Arc<PlatformInner>,
}

impl ToolClient {
    pub(crate) fn new(inner: Arc<PlatformInner>) -> Self {
        Self { inner }
    }

    /// Invoke a tool.
    ///
    /// Returns whatever status the orchestrator reports immediately,
    /// which may already be terminal for tools that need no approval.
    pub async fn invoke(
        &self,
        tool_name: &str,
        args: Value,
        idempotency_key: Option<&str>,
        timeout_ms: u64,
    ) -> PlatformResult<ToolResult> {
        let mut payload = json!({
            "run_id": self.inner.run_id,
            "args": args,
            "timeout_ms": timeout_ms,
        });
        if let Some(key) = idempotency_key {
            payload["idempotency_key"] = json!(key);
        }

        let response = self
            .inner
            .http
            .post(self.inner.url(&format!("/v1/tools/{}:invoke", tool_name)))
            .json(&payload)
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Get the current status of a tool call. One poll, one round trip.
    pub async fn get_status(&self, tool_call_id: &str) -> PlatformResult<ToolResult> {
        let response = self
            .inner
            .http
            .get(self.inner.url(&format!("/v1/tool_calls/{}", tool_call_id)))
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Long-poll the orchestrator for up to `timeout_ms`, then return
    /// whatever status it reports at that point.
    ///
    /// This does not retry in a loop; a still-pending result is handed
    /// back as-is. An exceeded HTTP deadline surfaces as
    /// [`super::PlatformError::Timeout`].
    pub async fn wait(&self, tool_call_id: &str, timeout_ms: u64) -> PlatformResult<ToolResult> {
        let response = self
            .inner
            .http
            .post(self.inner.url(&format!("/v1/tool_calls/{}:wait", tool_call_id)))
            .query(&[("timeout_ms", timeout_ms)])
            .timeout(Duration::from_millis(timeout_ms) + WAIT_GRACE)
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Invoke a tool and, only if the result is pending, wait once.
    ///
    /// Not a retry loop: one invoke, at most one wait, never a
    /// re-invoke.
    pub async fn invoke_and_wait(
        &self,
        tool_name: &str,
        args: Value,
        idempotency_key: Option<&str>,
        timeout_ms: u64,
    ) -> PlatformResult<ToolResult> {
        let result = self
            .invoke(tool_name, args, idempotency_key, timeout_ms)
            .await?;
        if result.pending() {
            return self.wait(&result.tool_call_id, timeout_ms).await;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_status_serde_round_trip() {
        for status in [ToolStatus::Succeeded, ToolStatus::Pending, ToolStatus::Failed] {
            let json = serde_json::to_string(&status).unwrap();
            let back: ToolStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_tool_status_rejects_unknown() {
        assert!(serde_json::from_str::<ToolStatus>(r#""cancelled""#).is_err());
    }

    #[test]
    fn test_tool_status_terminality() {
        assert!(ToolStatus::Succeeded.is_terminal());
        assert!(ToolStatus::Failed.is_terminal());
        assert!(!ToolStatus::Pending.is_terminal());
    }

    #[test]
    fn test_tool_result_deserialize_optional_fields() {
        let result: ToolResult =
            serde_json::from_str(r#"{"tool_call_id":"tc1","status":"pending"}"#).unwrap();
        assert!(result.pending());
        assert!(result.result.is_none());
        assert!(result.error.is_none());

        let result: ToolResult = serde_json::from_str(
            r#"{"tool_call_id":"tc1","status":"succeeded","result":{"temp":21}}"#,
        )
        .unwrap();
        assert!(result.succeeded());
        assert_eq!(result.result.unwrap()["temp"], 21);
    }
}
