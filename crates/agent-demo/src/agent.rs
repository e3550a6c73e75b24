//! Mock agent that simulates the LLM proxy's streaming behavior.

use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use agent_sdk::{Agent, AgentConfig, EventStream, InvokeContext, SseEmitter, Usage};

/// Characters per delta chunk.
const CHUNK_SIZE: usize = 5;
/// Simulated typing delay between chunks.
const CHUNK_DELAY_MS: u64 = 30;

/// Agent that answers every input with a canned streaming response,
/// logging the OpenAI-style chunk frames the real LLM proxy would
/// produce.
pub struct DemoAgent {
    config: AgentConfig,
}

impl DemoAgent {
    pub fn new() -> Self {
        Self {
            config: AgentConfig::new("demo", "Demo Agent")
                .with_version(env!("CARGO_PKG_VERSION"))
                .with_capabilities(vec!["streaming".to_string(), "llm-mock".to_string()]),
        }
    }
}

impl Default for DemoAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Agent for DemoAgent {
    fn config(&self) -> &AgentConfig {
        &self.config
    }

    async fn invoke(&self, ctx: InvokeContext) -> EventStream {
        info!(
            run_id = %ctx.run_id,
            input = %ctx.input_message.content,
            "incoming request"
        );

        let emitter = SseEmitter::new(Some(ctx.run_id.clone()));
        let user_input = ctx.input_message.content;
        let reply = format!("This is a mock LLM response for: {}", user_input);

        let chunk_id = format!("chatcmpl-{}", &Uuid::new_v4().simple().to_string()[..8]);
        let chunks = chunk_text(&reply, CHUNK_SIZE);
        let chunk_count = chunks.len() as u64;

        let prompt_tokens = user_input.split_whitespace().count() as u64;
        let completion_tokens = reply.split_whitespace().count() as u64;
        let usage = Usage {
            tokens: Some(prompt_tokens + completion_tokens),
            prompt_tokens: Some(prompt_tokens),
            completion_tokens: Some(completion_tokens),
            duration_ms: Some(chunk_count.saturating_sub(1) * CHUNK_DELAY_MS),
        };
        let done = emitter.done(Some(reply), Some(usage));

        let deltas = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| {
            let emitter = emitter.clone();
            let chunk_id = chunk_id.clone();
            async move {
                if i > 0 {
                    tokio::time::sleep(std::time::Duration::from_millis(CHUNK_DELAY_MS)).await;
                }
                // What the llmproxy SSE stream would carry for this chunk.
                let frame = json!({
                    "id": chunk_id,
                    "object": "chat.completion.chunk",
                    "choices": [{"index": 0, "delta": {"content": chunk}, "finish_reason": null}],
                });
                debug!("data: {}", frame);
                emitter.delta(&chunk)
            }
        });

        Box::pin(deltas.chain(stream::once(future::ready(done))))
    }
}

/// Split text into chunks of at most `chunk_size` characters.
fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_sdk::{HeaderOverrides, InvokeRequest, Message, Role};
    use futures::StreamExt;

    fn demo_ctx(input: &str) -> InvokeContext {
        InvokeContext::from_request(
            InvokeRequest {
                agent_id: "demo".to_string(),
                session_id: "s1".to_string(),
                run_id: "r1".to_string(),
                input_message: Message::new(Role::User, input),
                messages: None,
                context: None,
            },
            HeaderOverrides::default(),
        )
    }

    #[test]
    fn test_chunk_text_preserves_content() {
        let chunks = chunk_text("hello world", 5);
        assert_eq!(chunks.concat(), "hello world");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[tokio::test]
    async fn test_demo_agent_stream_shape() {
        let agent = DemoAgent::new();
        let events: Vec<String> = agent.invoke(demo_ctx("hello")).await.collect().await;

        assert!(!events.is_empty());
        // Exactly one terminal event, and it comes last.
        let terminals = events
            .iter()
            .filter(|e| e.starts_with("event: done") || e.starts_with("event: error"))
            .count();
        assert_eq!(terminals, 1);
        let last = events.last().unwrap();
        assert!(last.starts_with("event: done"));
        assert!(last.contains("This is a mock LLM response for: hello"));
        assert!(last.contains("prompt_tokens"));
    }

    #[tokio::test]
    async fn test_demo_agent_deltas_carry_run_id() {
        let agent = DemoAgent::new();
        let events: Vec<String> = agent.invoke(demo_ctx("hi")).await.collect().await;
        assert!(events[0].starts_with("event: delta"));
        assert!(events[0].contains("\"run_id\":\"r1\""));
    }
}
