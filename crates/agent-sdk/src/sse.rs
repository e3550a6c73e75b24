//! Server-Sent Events framing for the agent protocol.
//!
//! Encodes the four event kinds (`delta`, `state`, `done`, `error`)
//! into wire-ready SSE text, and parses inbound SSE line streams from
//! peer agents.

use futures::{StreamExt, future, stream};
use serde::Serialize;
use tracing::error;

use crate::agent::EventStream;
use crate::models::{DeltaEvent, DoneEvent, ErrorEvent, StateEvent, Usage};

/// Event types agents can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseEventType {
    Delta,
    State,
    Done,
    Error,
}

impl SseEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SseEventType::Delta => "delta",
            SseEventType::State => "state",
            SseEventType::Done => "done",
            SseEventType::Error => "error",
        }
    }
}

impl std::fmt::Display for SseEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a single SSE event.
///
/// `data` is written verbatim; serialize structured payloads to
/// compact JSON before calling this.
pub fn format_sse_event(event_type: SseEventType, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", event_type, data)
}

fn encode_event<T: Serialize>(event_type: SseEventType, payload: &T) -> String {
    match serde_json::to_string(payload) {
        Ok(json) => format_sse_event(event_type, &json),
        Err(err) => {
            // Event payloads are plain structs; this should be unreachable.
            error!("failed to encode {} event payload: {}", event_type, err);
            format_sse_event(
                SseEventType::Error,
                r#"{"code":"ENCODE_ERROR","message":"event payload serialization failed"}"#,
            )
        }
    }
}

/// Builder for wire-ready SSE event strings.
///
/// Each method is a pure function from its arguments (plus the fixed
/// `run_id`, attached only to delta events) to one encoded string.
#[derive(Debug, Clone, Default)]
pub struct SseEmitter {
    run_id: Option<String>,
}

impl SseEmitter {
    pub fn new(run_id: Option<String>) -> Self {
        Self { run_id }
    }

    /// Encode a delta (streaming text) event. Empty text is a valid
    /// (empty) chunk.
    pub fn delta(&self, text: &str) -> String {
        encode_event(
            SseEventType::Delta,
            &DeltaEvent {
                text: text.to_string(),
                run_id: self.run_id.clone(),
            },
        )
    }

    /// Encode a state change event.
    pub fn state(&self, state: &str, detail: Option<serde_json::Map<String, serde_json::Value>>) -> String {
        encode_event(
            SseEventType::State,
            &StateEvent {
                state: state.to_string(),
                detail,
            },
        )
    }

    /// Encode a terminal done event.
    pub fn done(&self, final_message: Option<String>, usage: Option<Usage>) -> String {
        encode_event(
            SseEventType::Done,
            &DoneEvent {
                final_message,
                usage,
            },
        )
    }

    /// Encode a terminal error event. Code and message are both
    /// mandatory on the wire, so they are mandatory here.
    pub fn error(&self, code: &str, message: &str) -> String {
        encode_event(
            SseEventType::Error,
            &ErrorEvent {
                code: code.to_string(),
                message: message.to_string(),
            },
        )
    }
}

/// Stream text as delta events with a simulated typing delay, ending
/// with a done event carrying the full text.
///
/// Convenience for demos and tests; chunks are counted in characters
/// so multi-byte input never splits mid-codepoint.
pub fn stream_text(
    text: impl Into<String>,
    run_id: Option<String>,
    chunk_size: usize,
    delay_ms: u64,
) -> EventStream {
    let text = text.into();
    let emitter = SseEmitter::new(run_id);
    let chunks = chunk_chars(&text, chunk_size);
    let done = emitter.done(Some(text), None);

    let deltas = stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| {
        let emitter = emitter.clone();
        async move {
            if delay_ms > 0 && i > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            }
            emitter.delta(&chunk)
        }
    });

    Box::pin(deltas.chain(stream::once(future::ready(done))))
}

/// Split text into chunks of at most `chunk_size` characters.
pub(crate) fn chunk_chars(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|c| c.iter().collect())
        .collect()
}

/// One parsed event from an inbound SSE stream.
#[derive(Debug, Clone, PartialEq)]
pub struct SseLine {
    /// Event type from the most recent `event:` line, if any. Lenient
    /// by design: a `data:` line before any `event:` line yields an
    /// unset type.
    pub event_type: Option<String>,
    /// Raw data payload, whitespace-trimmed.
    pub data: String,
}

/// Line-oriented parser for inbound agent SSE streams.
///
/// An `event:` line sets the type applied to subsequent `data:` lines;
/// blank lines are event separators and carry nothing; unrecognized
/// lines are ignored.
#[derive(Debug, Default)]
pub struct SseLineParser {
    pending: Option<String>,
}

impl SseLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns a parsed event when the line carries data.
    pub fn push_line(&mut self, line: &str) -> Option<SseLine> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(event_type) = line.strip_prefix("event:") {
            self.pending = Some(event_type.trim().to_string());
            return None;
        }
        if let Some(data) = line.strip_prefix("data:") {
            return Some(SseLine {
                event_type: self.pending.clone(),
                data: data.trim().to_string(),
            });
        }
        None
    }
}
