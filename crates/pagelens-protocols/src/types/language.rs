//! Supported output languages.

use serde::{Deserialize, Serialize};

/// A language the panel can emit artifacts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Ja,
    Es,
}

impl LanguageCode {
    /// All supported languages.
    pub const SUPPORTED: [LanguageCode; 3] = [LanguageCode::En, LanguageCode::Ja, LanguageCode::Es];

    /// BCP-47 base subtag.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Ja => "ja",
            LanguageCode::Es => "es",
        }
    }

    /// English name of the language, used when prompting a model.
    pub fn english_name(&self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Ja => "Japanese",
            LanguageCode::Es => "Spanish",
        }
    }

    /// Parse a language tag by its base subtag, ignoring case and any
    /// region suffix ("ja-JP" and "JA" both map to `Ja`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let base = tag
            .split(['-', '_'])
            .next()
            .unwrap_or(tag)
            .trim()
            .to_ascii_lowercase();
        match base.as_str() {
            "en" => Some(LanguageCode::En),
            "ja" => Some(LanguageCode::Ja),
            "es" => Some(LanguageCode::Es),
            _ => None,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
