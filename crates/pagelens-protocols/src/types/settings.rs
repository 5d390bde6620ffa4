//! User-facing panel settings.
//!
//! Settings are process-wide, persisted through an external
//! [`crate::SettingsStore`], loaded at init and mutated only by user
//! actions on the event loop.

use serde::{Deserialize, Serialize};

use super::LanguageCode;

/// Which summary artifacts to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryType {
    Tldr,
    KeyPoints,
    Both,
}

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

/// User's output-language preference. `Auto` derives the language from
/// the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLanguagePref {
    Auto,
    Ja,
    En,
    Es,
}

impl OutputLanguagePref {
    /// The fixed language this preference selects, or `None` for `Auto`.
    pub fn fixed(&self) -> Option<LanguageCode> {
        match self {
            OutputLanguagePref::Auto => None,
            OutputLanguagePref::Ja => Some(LanguageCode::Ja),
            OutputLanguagePref::En => Some(LanguageCode::En),
            OutputLanguagePref::Es => Some(LanguageCode::Es),
        }
    }
}

/// Panel settings blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub summary_type: SummaryType,
    pub summary_length: SummaryLength,
    pub output_language: OutputLanguagePref,
    pub auto_summarize: bool,
    pub speech_speed: f32,
    pub voice_uri: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            summary_type: SummaryType::Both,
            summary_length: SummaryLength::Medium,
            output_language: OutputLanguagePref::Auto,
            auto_summarize: true,
            speech_speed: 1.0,
            voice_uri: String::new(),
        }
    }
}
