//! Inbound webhook payload: a batch of events POSTed by the messaging platform.

use crate::pipeline::PipelineError;
use serde::Deserialize;

/// Webhook POST body: `{ "destination": "...", "events": [...] }`.
/// Events stay raw so one malformed event cannot fail the whole batch.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

/// Event kind. Anything other than `message` (follow, join, postback, ...) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    #[serde(other)]
    Other,
}

/// Message kind. Anything other than `text` (image, sticker, ...) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    #[serde(other)]
    Other,
}

/// One webhook event. Only the fields the relay reads are modelled.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub message: Option<InboundMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A text message event that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEvent {
    pub reply_token: String,
    pub text: String,
}

/// Decode one raw event. Any shape the relay cannot read counts as an invalid event kind.
pub fn parse_event(raw: &serde_json::Value) -> Result<InboundEvent, PipelineError> {
    InboundEvent::deserialize(raw).map_err(|e| {
        log::debug!("inbound: undecodable event: {}", e);
        PipelineError::InvalidEventKind
    })
}

/// Accept only `message` events carrying a `text` message and a reply token.
pub fn validate_event(event: &InboundEvent) -> Result<ValidEvent, PipelineError> {
    if event.kind != EventKind::Message {
        return Err(PipelineError::InvalidEventKind);
    }
    let Some(ref message) = event.message else {
        return Err(PipelineError::InvalidEventKind);
    };
    if message.kind != MessageKind::Text {
        return Err(PipelineError::InvalidEventKind);
    }
    match (&event.reply_token, &message.text) {
        (Some(token), Some(text)) => Ok(ValidEvent {
            reply_token: token.clone(),
            text: text.clone(),
        }),
        _ => Err(PipelineError::InvalidEventKind),
    }
}
