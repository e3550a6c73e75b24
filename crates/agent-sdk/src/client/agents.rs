//! Agent-to-agent relay sub-client.

use std::sync::Arc;

use futures::{Stream, StreamExt, TryStreamExt, future};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::io::StreamReader;

use super::{PlatformError, PlatformInner, PlatformResult, stop_after_error};
use crate::models::{AgentInfo, Message};
use crate::sse::SseLineParser;

/// One event relayed from a child agent's SSE stream.
///
/// `event_type` can be unset when the child emitted a `data:` line
/// before any `event:` line; callers must tolerate that.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStreamEvent {
    pub event_type: Option<String>,
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct AgentListResponse {
    agents: Vec<AgentInfo>,
}

/// Client for calling peer agents through the orchestrator.
pub struct AgentRelayClient {
    inner: Arc<PlatformInner>,
}

impl AgentRelayClient {
    pub(crate) fn new(inner: Arc<PlatformInner>) -> Self {
        Self { inner }
    }

    /// Invoke another agent and stream its response events.
    ///
    /// The sequence ends when the transport stream ends; there is no
    /// `[DONE]` sentinel at this layer. Malformed JSON in a data line
    /// is a decode error and ends the sequence.
    pub async fn invoke(
        &self,
        agent_id: &str,
        message: &Message,
    ) -> PlatformResult<impl Stream<Item = PlatformResult<AgentStreamEvent>> + use<>> {
        let payload = json!({
            "parent_run_id": self.inner.run_id,
            "input_message": message,
        });

        let response = self
            .inner
            .http
            .post(self.inner.url(&format!("/v1/agents/{}:invoke", agent_id)))
            .json(&payload)
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;

        let reader = StreamReader::new(
            response
                .bytes_stream()
                .map_err(std::io::Error::other),
        );
        let lines = LinesStream::new(reader.lines());

        let events = lines
            .scan(SseLineParser::new(), |parser, line| {
                let item = match line {
                    Err(e) => Some(Err(PlatformError::Transport(e.to_string()))),
                    Ok(line) => parser.push_line(&line).map(|event| {
                        serde_json::from_str::<Value>(&event.data)
                            .map(|data| AgentStreamEvent {
                                event_type: event.event_type,
                                data,
                            })
                            .map_err(|e| PlatformError::Decode(e.to_string()))
                    }),
                };
                future::ready(Some(item))
            })
            .filter_map(future::ready);

        Ok(stop_after_error(events))
    }

    /// List all registered agents.
    pub async fn list_agents(&self) -> PlatformResult<Vec<AgentInfo>> {
        let response = self
            .inner
            .http
            .get(self.inner.url("/v1/agents"))
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;
        let list: AgentListResponse = response.json().await?;
        Ok(list.agents)
    }
}
