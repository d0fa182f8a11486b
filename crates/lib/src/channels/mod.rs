//! Communication channels (LINE).
//!
//! Inbound webhook payload types, the reply dispatcher seam the pipeline talks to,
//! and the LINE Messaging API connector that implements it.

mod inbound;
mod line;
mod reply;

pub use inbound::{
    parse_event, validate_event, EventKind, InboundEvent, InboundMessage, MessageKind, ValidEvent, WebhookBody,
};
pub use line::{verify_signature, LineChannel, LineError, SIGNATURE_HEADER};
pub use reply::{ReplyDispatcher, ReplyPayload};
