//! LINE channel: webhook signature verification and replies via the Messaging API.

use crate::channels::reply::{ReplyDispatcher, ReplyPayload};
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

/// Header carrying base64(HMAC-SHA256(channel secret, body)).
pub const SIGNATURE_HEADER: &str = "X-Line-Signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("line api error: {0}")]
    Api(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [&'a ReplyPayload; 1],
}

/// Verify the webhook signature. The comparison is constant time.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let provided = match base64::engine::general_purpose::STANDARD.decode(signature.trim()) {
        Ok(b) => b,
        Err(_) => {
            log::debug!("line signature is not valid base64");
            return false;
        }
    };
    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

/// LINE Messaging API connector (reply only; inbound arrives via the gateway webhook).
#[derive(Clone)]
pub struct LineChannel {
    api_base: String,
    access_token: String,
    client: reqwest::Client,
}

impl LineChannel {
    pub fn new(api_base: &str, access_token: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
            client: reqwest::Client::new(),
        }
    }

    /// POST /v2/bot/message/reply with a single message.
    pub async fn reply_message(
        &self,
        reply_token: &str,
        payload: &ReplyPayload,
    ) -> Result<(), LineError> {
        let url = format!("{}/v2/bot/message/reply", self.api_base);
        let body = ReplyRequest {
            reply_token,
            messages: [payload],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(LineError::Api(format!("reply failed: {} {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl ReplyDispatcher for LineChannel {
    async fn reply(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), LineError> {
        self.reply_message(reply_token, payload).await
    }
}
