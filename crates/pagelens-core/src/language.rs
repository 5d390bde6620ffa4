//! Language resolution and repair heuristics.
//!
//! The thresholds and word lists here are tunable policy guesses about
//! an external model's behavior, not a correctness contract.

use once_cell::sync::Lazy;
use regex::Regex;

use pagelens_protocols::types::{LanguageCode, OutputLanguagePref};

/// Number of leading characters sampled by [`looks_like_english`].
const SAMPLE_CHARS: usize = 500;

/// Non-ASCII fraction above which text is assumed non-English.
const NON_ASCII_THRESHOLD: f32 = 0.15;

/// Decide the effective output language.
///
/// A non-`Auto` user selection wins verbatim. Otherwise the page
/// language's base subtag is used when supported, defaulting to English.
pub fn resolve_output_language(
    pref: OutputLanguagePref,
    page_lang: Option<&str>,
) -> LanguageCode {
    if let Some(fixed) = pref.fixed() {
        return fixed;
    }
    page_lang
        .and_then(LanguageCode::from_tag)
        .unwrap_or(LanguageCode::En)
}

/// Heuristic gate to avoid double-translating output a model already
/// emitted in the target language. Samples the leading 500 characters
/// and checks the fraction of code points above the ASCII range.
pub fn looks_like_english(text: &str) -> bool {
    let mut total = 0usize;
    let mut non_ascii = 0usize;
    for ch in text.chars().take(SAMPLE_CHARS) {
        total += 1;
        if ch as u32 > 127 {
            non_ascii += 1;
        }
    }
    if total == 0 {
        return true;
    }
    (non_ascii as f32 / total as f32) < NON_ASCII_THRESHOLD
}

/// Localized renderings of the importance markers, normalized back to
/// the canonical bracketed English tags. Models asked for `[HIGH]` in a
/// non-English context routinely localize the word inside the brackets.
static TAG_REPAIRS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // English casing drift and Spanish renderings.
        (
            Regex::new(r"(?i)\[\s*(?:high|alta|alto)\s*\]").unwrap(),
            "[HIGH]",
        ),
        (
            Regex::new(r"(?i)\[\s*(?:medium|media|medio)\s*\]").unwrap(),
            "[MEDIUM]",
        ),
        (
            Regex::new(r"(?i)\[\s*(?:low|baja|bajo)\s*\]").unwrap(),
            "[LOW]",
        ),
        // Japanese renderings, including fullwidth brackets.
        (
            Regex::new(r"[\[【（]\s*(?:高|重要度高|重要)\s*[\]】）]").unwrap(),
            "[HIGH]",
        ),
        (Regex::new(r"[\[【（]\s*(?:中|普通)\s*[\]】）]").unwrap(), "[MEDIUM]"),
        (Regex::new(r"[\[【（]\s*(?:低|参考)\s*[\]】）]").unwrap(), "[LOW]"),
    ]
});

/// Normalize localized importance markers back to `[HIGH]`, `[MEDIUM]`,
/// `[LOW]`. Must run after every tag-bearing generation, before parsing.
pub fn repair_importance_tags(text: &str) -> String {
    let mut repaired = text.to_string();
    for (pattern, canonical) in TAG_REPAIRS.iter() {
        repaired = pattern.replace_all(&repaired, *canonical).into_owned();
    }
    repaired
}
