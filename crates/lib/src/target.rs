//! Target-language resolution.
//!
//! Korean text is translated to English unless the sender appends a suffix tag
//! (e.g. `.fr`) selecting another language; the tag is stripped before translating.
//! Any other source language is translated to Korean, with no suffix inspection.

use crate::translate::TranslationRequest;

/// Source language that enables suffix tags.
pub const HOME_LANGUAGE: &str = "ko";

/// Target for home-language text without a recognized suffix tag.
pub const DEFAULT_FOREIGN_TARGET: &str = "en";

/// Recognized suffix tags and the target language each selects.
pub const SUFFIX_TAGS: [(&str, &str); 7] = [
    (".cn", "zh-CN"),
    (".tw", "zh-TW"),
    (".es", "es"),
    (".fr", "fr"),
    (".vi", "vi"),
    (".th", "th"),
    (".id", "id"),
];

/// Target selected by the tag ending `text`, and the text with the tag removed.
/// Tags are three ASCII characters, so a text shorter than three characters never matches.
fn match_suffix_tag(text: &str) -> Option<(&'static str, &str)> {
    SUFFIX_TAGS
        .iter()
        .find_map(|(tag, target)| text.strip_suffix(*tag).map(|rest| (*target, rest)))
}

/// Resolve source, target and effective text for a message in `detected` language.
pub fn resolve_target(detected: &str, text: &str) -> TranslationRequest {
    let (target, effective) = if detected == HOME_LANGUAGE {
        match_suffix_tag(text).unwrap_or((DEFAULT_FOREIGN_TARGET, text))
    } else {
        (HOME_LANGUAGE, text)
    };
    TranslationRequest {
        source: detected.to_string(),
        target: target.to_string(),
        text: effective.to_string(),
    }
}
