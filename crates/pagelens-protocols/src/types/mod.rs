//! Shared data types for the panel core.

mod artifact;
mod language;
mod page;
mod settings;

pub use artifact::{
    ArtifactKind, ArtifactResult, ChatMessage, ChatRole, DialogueTurn, GenerationStatus,
    Importance, QuizPair, RenderPayload, TaggedItem,
};
pub use language::LanguageCode;
pub use page::{PageSnapshot, TabId};
pub use settings::{OutputLanguagePref, Settings, SummaryLength, SummaryType};
