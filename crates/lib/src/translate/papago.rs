//! Papago API client (https://openapi.naver.com/v1/papago by default).
//! Language detection (`detectLangs`) and machine translation (`n2mt`).

use crate::config::{PapagoConfig, PapagoCredentials};
use crate::translate::{Detection, LanguageDetector, Translation, TranslationRequest, Translator};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";

/// Client for the Papago detection and translation endpoints.
#[derive(Clone)]
pub struct PapagoClient {
    detect_url: String,
    translate_url: String,
    credentials: PapagoCredentials,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum PapagoError {
    #[error("papago request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("papago api error: {0}")]
    Api(String),
    #[error("papago response malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectResponse {
    lang_code: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    message: TranslateMessage,
}

#[derive(Debug, Deserialize)]
struct TranslateMessage {
    result: TranslateResult,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResult {
    translated_text: String,
}

impl PapagoClient {
    pub fn new(config: &PapagoConfig, credentials: PapagoCredentials) -> Result<Self, PapagoError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            detect_url: config.detect_url.clone(),
            translate_url: config.translate_url.clone(),
            credentials,
            client: builder.build()?,
        })
    }

    /// POST a form with client credentials; only 200 counts as success.
    async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<T, PapagoError> {
        let res = self
            .client
            .post(url)
            .header(CLIENT_ID_HEADER, &self.credentials.client_id)
            .header(CLIENT_SECRET_HEADER, &self.credentials.client_secret)
            .form(form)
            .send()
            .await?;
        if res.status() != reqwest::StatusCode::OK {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(PapagoError::Api(format!("{} {}", status, body)));
        }
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| PapagoError::Malformed(e.to_string()))
    }

    /// POST detectLangs with `query`.
    pub async fn detect_language(&self, text: &str) -> Result<Detection, PapagoError> {
        let data: DetectResponse = self.post_form(&self.detect_url, &[("query", text)]).await?;
        let code = data.lang_code.trim();
        if code.is_empty() {
            return Err(PapagoError::Malformed("empty langCode".to_string()));
        }
        log::info!("papago detected language: {}", code);
        Ok(Detection {
            language_code: code.to_string(),
        })
    }

    /// POST n2mt with `source`, `target`, `text`.
    pub async fn translate_text(
        &self,
        request: &TranslationRequest,
    ) -> Result<Translation, PapagoError> {
        let data: TranslateResponse = self
            .post_form(
                &self.translate_url,
                &[
                    ("source", request.source.as_str()),
                    ("target", request.target.as_str()),
                    ("text", request.text.as_str()),
                ],
            )
            .await?;
        Ok(Translation {
            translated_text: data.message.result.translated_text,
        })
    }
}

#[async_trait]
impl LanguageDetector for PapagoClient {
    async fn detect(&self, text: &str) -> Result<Detection, PapagoError> {
        self.detect_language(text).await
    }
}

#[async_trait]
impl Translator for PapagoClient {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, PapagoError> {
        self.translate_text(request).await
    }
}
