//! LLM proxy sub-client (OpenAI-compatible), routed through the
//! platform for tracing.

use std::sync::Arc;

use futures::{Stream, TryStreamExt, future};
use serde_json::{Value, json};
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::io::StreamReader;

use super::{PlatformError, PlatformInner, PlatformResult, stop_after_error};

/// Streaming terminator used by the chat-completions SSE protocol.
const DONE_SENTINEL: &str = "[DONE]";

/// OpenAI-compatible LLM client that routes through the platform's
/// LLM proxy.
pub struct LlmClient {
    inner: Arc<PlatformInner>,
}

impl LlmClient {
    pub(crate) fn new(inner: Arc<PlatformInner>) -> Self {
        Self { inner }
    }

    /// Create a chat completion (non-streaming). One round trip;
    /// non-2xx raises [`PlatformError::Http`].
    pub async fn chat_completions(
        &self,
        model: &str,
        messages: Vec<Value>,
    ) -> PlatformResult<Value> {
        let payload = json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        let response = self
            .inner
            .http
            .post(self.inner.url("/v1/chat/completions"))
            .header("x-run-id", &self.inner.run_id)
            .json(&payload)
            .send()
            .await?;
        let response = self.inner.ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Create a streaming chat completion.
    ///
    /// Reads newline-delimited SSE, keeps only `data:`-prefixed lines,
    /// stops without emitting at the literal `[DONE]` sentinel, and
    /// decodes everything else as JSON. A malformed chunk yields a
    /// [`PlatformError::Decode`] and ends the stream.
    pub async fn chat_completions_stream(
        &self,
        model: &str,
        messages: Vec<Value>,
    ) -> PlatformResult<impl Stream<Item = PlatformResult<Value>>> {
        let payload = json!({
            "model": model,
            "messages": messages,
            "stream": true,
        });

        let response = self
            .inner
            .http
            .post(self.inner.url("/v1/chat/completions"))
            .header("x-run-id", &self.inner.run_id)
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

        let chunks = lines
            .map_err(|e| PlatformError::Transport(e.to_string()))
            .try_filter_map(|line| {
                future::ok(
                    line.trim_end()
                        .strip_prefix("data: ")
                        .map(str::to_string),
                )
            })
            .try_take_while(|data| future::ready(Ok(data != DONE_SENTINEL)))
            .and_then(|data| {
                future::ready(
                    serde_json::from_str::<Value>(&data)
                        .map_err(|e| PlatformError::Decode(e.to_string())),
                )
            });

        Ok(stop_after_error(chunks))
    }
}
