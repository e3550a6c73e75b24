//! Session history sub-client.

use std::sync::Arc;

use serde::Deserialize;

use super::{PlatformInner, PlatformResult};
use crate::models::Message;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<Message>,
}

/// Client for reading session transcripts from the orchestrator.
pub struct SessionClient {
    inner: Arc<PlatformInner>,
}

impl SessionClient {
    pub(crate) fn new(inner: Arc<PlatformInner>) -> Self {
        Self { inner }
    }

    /// Get messages for a session, newest page first.
    ///
    /// `before` is the pagination cursor returned alongside a previous
    /// page; omit it for the first page.
    pub async fn get_messages(
        &self,
        session_id: &str,
        limit: u32,
        before: Option<&str>,
    ) -> PlatformResult<Vec<Message>> {
        let mut request = self
            .inner
            .http
            .get(self.inner.url(&format!("/v1/sessions/{}/messages", session_id)))
            .query(&[("limit", limit)]);
        if let Some(before) = before {
            request = request.query(&[("before", before)]);
        }

        let response = request.send().await?;
        let response = self.inner.ensure_success(response).await?;
        let body: MessagesResponse = response.json().await?;
        Ok(body.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_messages_response_parse() {
        let json = r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#;
        let body: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, Role::User);
    }
}
