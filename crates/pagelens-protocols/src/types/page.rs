//! Page snapshot and tab identity types.

use serde::{Deserialize, Serialize};

/// Identifier of one browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub u32);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Immutable extract of one page, taken once per tab and replaced
/// wholesale on re-extraction or navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Extracted main text.
    pub text: String,

    /// Page title.
    pub title: String,

    /// Page URL at extraction time.
    pub url: String,

    /// Language tag reported by the page, if any (e.g. "ja", "en-US").
    pub lang: Option<String>,

    /// Character count of `text`.
    pub char_count: usize,

    /// Whether the extractor trimmed the page to a size cap.
    pub truncated: bool,
}

impl PageSnapshot {
    /// Build a snapshot from extracted text, computing the character count.
    pub fn new(
        text: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        lang: Option<String>,
    ) -> Self {
        let text = text.into();
        let char_count = text.chars().count();
        Self {
            text,
            title: title.into(),
            url: url.into(),
            lang,
            char_count,
            truncated: false,
        }
    }

    /// Leading excerpt of at most `max_chars` characters, cut on a
    /// character boundary.
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}
