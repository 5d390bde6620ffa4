//! # PageLens Protocols
//!
//! Core protocol definitions (traits and data types) for the PageLens
//! panel core. Contains only interface definitions and plain data
//! behavior - no orchestration logic.
//!
//! ## Core Traits
//!
//! - [`CapabilityProvider`] - Trait for on-device model capabilities
//! - [`ModelSession`] - Trait for a scoped capability session
//! - [`TextExtractor`] - Trait for the page-text extraction collaborator
//! - [`SettingsStore`] - Trait for the settings persistence collaborator
//! - [`RenderSink`] - Trait for the render-layer collaborator

pub mod cancel;
pub mod capability;
pub mod error;
pub mod extract;
pub mod render;
pub mod settings_store;
pub mod types;

// Re-export core traits
pub use cancel::CancelToken;
pub use capability::{
    Availability, CapabilityKind, CapabilityProvider, ChunkStream, ModelSession, SessionOptions,
};
pub use error::{ExtractError, GatewayError, PipelineError, SettingsError};
pub use extract::TextExtractor;
pub use render::{sanitize_plain, RenderSink, StatusNote};
pub use settings_store::SettingsStore;
pub use types::*;
