//! # PageLens Core
//!
//! Generation/translation orchestration core for the PageLens panel:
//! model gateway, language resolution, the per-artifact generation
//! pipeline, cancellation control, and the tab-scoped artifact cache.

pub mod cache;
pub mod control;
pub mod gateway;
pub mod language;
pub mod messages;
pub mod panel;
pub mod parse;
pub mod pipeline;
pub mod prompts;
pub mod streaming;

#[cfg(test)]
pub(crate) mod testutil;

pub use cache::{TabCache, TabCacheEntry};
pub use control::SlotController;
pub use gateway::{ModelGateway, SessionHandle};
pub use language::{looks_like_english, repair_importance_tags, resolve_output_language};
pub use messages::localized_message;
pub use panel::{PanelDeps, PanelSession};
pub use pipeline::GenerationPipeline;
pub use streaming::{ChunkMode, StreamAccumulator};
