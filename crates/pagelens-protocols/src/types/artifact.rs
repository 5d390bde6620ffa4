//! Generated artifact types and the render-layer payload contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One kind of generated content. Each kind owns one generation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Tldr,
    KeyPoints,
    Quiz,
    Dialogue,
    ChatAnswer,
}

impl ArtifactKind {
    /// All artifact kinds, in render order.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Tldr,
        ArtifactKind::KeyPoints,
        ArtifactKind::Quiz,
        ArtifactKind::Dialogue,
        ArtifactKind::ChatAnswer,
    ];
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ArtifactKind::Tldr => "tldr",
            ArtifactKind::KeyPoints => "key-points",
            ArtifactKind::Quiz => "quiz",
            ArtifactKind::Dialogue => "dialogue",
            ArtifactKind::ChatAnswer => "chat-answer",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of one generation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Idle,
    Running,
    Cancelled,
    Error,
    Done,
}

/// Importance marker attached to a key-point item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Medium,
    Low,
    None,
}

impl Importance {
    /// Canonical bracketed tag, e.g. `[HIGH]`. Untagged items have no tag.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Importance::High => Some("[HIGH]"),
            Importance::Medium => Some("[MEDIUM]"),
            Importance::Low => Some("[LOW]"),
            Importance::None => None,
        }
    }
}

/// One importance-tagged item handed to the render layer, pre-parsed so
/// the renderer never sees raw tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedItem {
    pub importance: Importance,
    pub body: String,
}

impl TaggedItem {
    pub fn new(importance: Importance, body: impl Into<String>) -> Self {
        Self {
            importance,
            body: body.into(),
        }
    }
}

/// One quiz question/answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizPair {
    pub question: String,
    pub answer: String,
}

/// One line of a two-speaker dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub speaker: String,
    pub line: String,
}

/// Role of a chat transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One chat transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Structured content handed to the render layer. Always plain text;
/// the core sanitizes every string before publishing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RenderPayload {
    Text(String),
    Tagged(Vec<TaggedItem>),
    Quiz(Vec<QuizPair>),
    Dialogue(Vec<DialogueTurn>),
    Chat(ChatMessage),
}

/// Result of one artifact generation, mirrored into the tab cache on
/// successful completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactResult {
    /// Raw model output after tag repair, before structuring.
    pub raw_text: Option<String>,
    /// Structured payload as handed to the render layer.
    pub payload: Option<RenderPayload>,
    /// Slot lifecycle state.
    pub status: GenerationStatus,
}

impl ArtifactResult {
    /// A slot that has never run.
    pub fn idle() -> Self {
        Self {
            raw_text: None,
            payload: None,
            status: GenerationStatus::Idle,
        }
    }

    /// A completed result.
    pub fn done(raw_text: impl Into<String>, payload: RenderPayload) -> Self {
        Self {
            raw_text: Some(raw_text.into()),
            payload: Some(payload),
            status: GenerationStatus::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_kind_display() {
        assert_eq!(ArtifactKind::KeyPoints.to_string(), "key-points");
        assert_eq!(ArtifactKind::ChatAnswer.to_string(), "chat-answer");
    }

    #[test]
    fn test_importance_tag() {
        assert_eq!(Importance::High.tag(), Some("[HIGH]"));
        assert_eq!(Importance::None.tag(), None);
    }

    #[test]
    fn test_artifact_result_done() {
        let result = ArtifactResult::done("raw", RenderPayload::Text("raw".to_string()));
        assert_eq!(result.status, GenerationStatus::Done);
        assert_eq!(result.raw_text.as_deref(), Some("raw"));
    }

    #[test]
    fn test_chat_message_roles() {
        assert_eq!(ChatMessage::user("q").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").role, ChatRole::Assistant);
    }

    #[test]
    fn test_render_payload_serde() {
        let payload = RenderPayload::Tagged(vec![TaggedItem::new(Importance::High, "Point A")]);
        let json = serde_json::to_string(&payload).unwrap();
        let back: RenderPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
