//! Reply dispatch: the seam through which the pipeline answers an event.

use crate::channels::line::LineError;
use async_trait::async_trait;
use serde::Serialize;

/// Reply message body: `{ "type": "text", "text": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ReplyPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

/// Sends a reply to the conversation that produced a reply token.
#[async_trait]
pub trait ReplyDispatcher: Send + Sync {
    async fn reply(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), LineError>;
}
