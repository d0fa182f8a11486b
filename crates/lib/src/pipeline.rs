//! Per-event translation pipeline.
//!
//! Each event moves through `Validating → Detecting → Resolving → Translating → Replying → Done`.
//! Validation failure rejects the event silently. Detection failure drops it without a reply.
//! Translation failure sends the fallback reply first, then reports the error.
//! A batch runs all events concurrently on the current task and never lets one
//! event's failure stop its siblings.

use crate::channels::{
    parse_event, validate_event, InboundEvent, LineError, ReplyDispatcher, ReplyPayload, ValidEvent,
};
use crate::target::resolve_target;
use crate::translate::{LanguageDetector, PapagoError, Translation, TranslationRequest, Translator};
use futures_util::future::join_all;
use std::sync::Arc;

/// Pipeline stage of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Detecting,
    Resolving,
    Translating,
    Replying,
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("event is not a text message")]
    InvalidEventKind,
    #[error("language detection failed: {0}")]
    Detection(#[source] PapagoError),
    #[error("translation failed: {0}")]
    Translation(#[source] PapagoError),
    #[error("reply dispatch failed: {0}")]
    Dispatch(#[source] LineError),
}

impl PipelineError {
    /// Stage in which the error occurred.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidEventKind => Stage::Validating,
            PipelineError::Detection(_) => Stage::Detecting,
            PipelineError::Translation(_) => Stage::Translating,
            PipelineError::Dispatch(_) => Stage::Replying,
        }
    }
}

/// Terminal state of one event's run.
#[derive(Debug)]
pub enum EventOutcome {
    /// Translated and replied.
    Done,
    /// Not a text message; nothing was called.
    Rejected(PipelineError),
    /// Detection, translation or reply failed.
    Failed(PipelineError),
}

/// Counts of terminal states across one webhook batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub replied: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl BatchReport {
    pub fn is_failed(&self) -> bool {
        self.failed > 0
    }

    fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::Done => self.replied += 1,
            EventOutcome::Rejected(_) => self.rejected += 1,
            EventOutcome::Failed(_) => self.failed += 1,
        }
    }
}

/// Detect the language of `text` and resolve the translation request.
pub async fn detect_and_resolve(
    detector: &dyn LanguageDetector,
    text: &str,
) -> Result<TranslationRequest, PipelineError> {
    let detection = detector
        .detect(text)
        .await
        .map_err(PipelineError::Detection)?;
    Ok(resolve_target(&detection.language_code, text))
}

/// Detect, resolve and translate without replying anywhere.
pub async fn translate_text(
    detector: &dyn LanguageDetector,
    translator: &dyn Translator,
    text: &str,
) -> Result<(TranslationRequest, Translation), PipelineError> {
    let request = detect_and_resolve(detector, text).await?;
    let translation = translator
        .translate(&request)
        .await
        .map_err(PipelineError::Translation)?;
    Ok((request, translation))
}

/// Shared, read-only collaborators for every event run.
pub struct Pipeline {
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    dispatcher: Arc<dyn ReplyDispatcher>,
    fallback_text: String,
}

impl Pipeline {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
        dispatcher: Arc<dyn ReplyDispatcher>,
        fallback_text: String,
    ) -> Self {
        Self {
            detector,
            translator,
            dispatcher,
            fallback_text,
        }
    }

    /// Run every raw webhook event concurrently and join. Failures are counted, not propagated.
    pub async fn run_batch(&self, events: &[serde_json::Value]) -> BatchReport {
        let outcomes = join_all(events.iter().map(|e| self.run_raw_event(e))).await;
        let mut report = BatchReport::default();
        for outcome in &outcomes {
            report.record(outcome);
        }
        report
    }

    /// Decode a raw event, then run it. Undecodable events are rejected.
    pub async fn run_raw_event(&self, raw: &serde_json::Value) -> EventOutcome {
        match parse_event(raw) {
            Ok(event) => self.run_event(&event).await,
            Err(e) => EventOutcome::Rejected(e),
        }
    }

    /// Run one event to a terminal state.
    pub async fn run_event(&self, event: &InboundEvent) -> EventOutcome {
        let valid = match validate_event(event) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("pipeline: rejected event ({:?})", event.kind);
                return EventOutcome::Rejected(e);
            }
        };
        match self.process(&valid).await {
            Ok(()) => {
                log::debug!("pipeline: {:?}", Stage::Done);
                EventOutcome::Done
            }
            Err(e) => {
                log::warn!("pipeline: {:?} failed: {}", e.stage(), e);
                EventOutcome::Failed(e)
            }
        }
    }

    async fn process(&self, event: &ValidEvent) -> Result<(), PipelineError> {
        log::debug!("pipeline: {:?}", Stage::Detecting);
        let request = detect_and_resolve(self.detector.as_ref(), &event.text).await?;
        log::debug!(
            "pipeline: {:?} {} -> {}",
            Stage::Resolving,
            request.source,
            request.target
        );

        log::debug!("pipeline: {:?}", Stage::Translating);
        let translation = match self.translator.translate(&request).await {
            Ok(t) => t,
            Err(e) => {
                let fallback = ReplyPayload::text(self.fallback_text.as_str());
                if let Err(de) = self.dispatcher.reply(&event.reply_token, &fallback).await {
                    log::warn!("pipeline: fallback reply failed: {}", de);
                }
                return Err(PipelineError::Translation(e));
            }
        };

        log::debug!("pipeline: {:?}", Stage::Replying);
        let payload = ReplyPayload::text(translation.translated_text);
        self.dispatcher
            .reply(&event.reply_token, &payload)
            .await
            .map_err(PipelineError::Dispatch)
    }
}
