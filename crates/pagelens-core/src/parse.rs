//! Parsers for structured model output.
//!
//! Model output is best-effort text; these parsers take what matches
//! and drop what doesn't. Deciding whether "nothing parsed" is an error
//! belongs to the pipeline, not here.

use once_cell::sync::Lazy;
use regex::Regex;

use pagelens_protocols::types::{DialogueTurn, Importance, QuizPair, TaggedItem};

static TAGGED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*•]|\d+[.)])?\s*\[(HIGH|MEDIUM|LOW)\]\s*(.*)$").unwrap()
});

static QUIZ_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(Q|A)\s*(\d+)\s*[:：]\s*(.*)$").unwrap());

static DIALOGUE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([^:：]{1,40}?)\s*[:：]\s*(.+)$").unwrap());

/// Parse bulleted, importance-tagged lines into items, preserving order.
/// Lines without a recognized tag become [`Importance::None`] items.
/// Run [`crate::language::repair_importance_tags`] first.
pub fn parse_tagged_items(text: &str) -> Vec<TaggedItem> {
    let mut items = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = TAGGED_LINE.captures(trimmed) {
            let importance = match &caps[1] {
                "HIGH" => Importance::High,
                "MEDIUM" => Importance::Medium,
                _ => Importance::Low,
            };
            let body = caps[2].trim();
            if !body.is_empty() {
                items.push(TaggedItem::new(importance, body));
            }
        } else {
            let body = trimmed
                .trim_start_matches(['-', '*', '•'])
                .trim();
            if !body.is_empty() {
                items.push(TaggedItem::new(Importance::None, body));
            }
        }
    }
    items
}

/// Reassemble tagged items into the canonical line format. Inverse of
/// [`parse_tagged_items`] for tagged items.
pub fn render_tagged_items(items: &[TaggedItem]) -> String {
    items
        .iter()
        .map(|item| match item.importance.tag() {
            Some(tag) => format!("- {} {}", tag, item.body),
            None => format!("- {}", item.body),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse `Q<n>:`/`A<n>:` lines, pairing each question with the next
/// answer carrying the same index. Returns at most 3 pairs.
pub fn parse_quiz(text: &str) -> Vec<QuizPair> {
    let mut pairs = Vec::new();
    let mut pending: Option<(u32, String)> = None;

    for line in text.lines() {
        let Some(caps) = QUIZ_LINE.captures(line) else {
            continue;
        };
        let index: u32 = match caps[2].parse() {
            Ok(n) => n,
            Err(_) => continue,
        };
        let body = caps[3].trim().to_string();
        if body.is_empty() {
            continue;
        }
        match &caps[1] {
            "Q" => pending = Some((index, body)),
            _ => {
                if let Some((q_index, question)) = pending.take() {
                    if q_index == index {
                        pairs.push(QuizPair {
                            question,
                            answer: body,
                        });
                    }
                }
            }
        }
    }

    pairs.truncate(3);
    pairs
}

/// Parse `Speaker: line` turns. Unparsed lines are dropped.
pub fn parse_dialogue(text: &str) -> Vec<DialogueTurn> {
    text.lines()
        .filter_map(|line| {
            let caps = DIALOGUE_LINE.captures(line)?;
            let speaker = caps[1].trim().trim_start_matches(['-', '*']).trim();
            let spoken = caps[2].trim();
            if speaker.is_empty() || spoken.is_empty() {
                return None;
            }
            Some(DialogueTurn {
                speaker: speaker.to_string(),
                line: spoken.to_string(),
            })
        })
        .collect()
}
