//! Language detection and translation.
//!
//! The pipeline depends on the [`LanguageDetector`] and [`Translator`] traits;
//! [`PapagoClient`] implements both against the Naver Papago HTTP API.

mod papago;

pub use papago::{PapagoClient, PapagoError};

use async_trait::async_trait;

/// Detected source language, e.g. "ko", "en", "zh-CN".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub language_code: String,
}

/// What to translate and between which languages. Both codes are non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub source: String,
    pub target: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated_text: String,
}

#[async_trait]
pub trait LanguageDetector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<Detection, PapagoError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation, PapagoError>;
}
