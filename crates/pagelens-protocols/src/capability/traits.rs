//! Capability and session trait definitions.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use super::SessionOptions;
use crate::error::GatewayError;
use crate::types::LanguageCode;

/// The three capability kinds the panel orchestrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Summarizer,
    Generator,
    Translator,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CapabilityKind::Summarizer => "summarizer",
            CapabilityKind::Generator => "generator",
            CapabilityKind::Translator => "translator",
        };
        f.write_str(name)
    }
}

/// Availability of a capability for a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Capability absent or unsupported on this device.
    Unavailable,
    /// Capability exists but its model must be downloaded first, which
    /// requires a user gesture.
    Downloadable,
    /// Ready for immediate use.
    Available,
}

/// Stream of text chunks from a streaming capability.
///
/// Chunk semantics vary by provider: chunks may be deltas or cumulative
/// replacements. The core auto-detects the mode per stream.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, GatewayError>> + Send>>;

/// Core trait for capability providers.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// Which capability this provider implements.
    fn kind(&self) -> CapabilityKind;

    /// Probe availability. The gateway treats probe errors as
    /// [`Availability::Unavailable`].
    async fn availability(
        &self,
        lang_hint: Option<LanguageCode>,
    ) -> Result<Availability, GatewayError>;

    /// Create a session. Providers must honor `options.user_gesture`:
    /// a first-time model download outside a user-gesture call stack
    /// fails with [`GatewayError::ModelDownloadRequired`].
    async fn create_session(
        &self,
        options: SessionOptions,
    ) -> Result<Box<dyn ModelSession>, GatewayError>;
}

/// A scoped, stateful handle to an invoked capability.
///
/// Sessions are not reusable across retry attempts and must be released
/// exactly once via [`ModelSession::destroy`] on every exit path.
#[async_trait]
pub trait ModelSession: Send + Sync {
    /// One-shot invocation.
    async fn invoke(&self, input: &str) -> Result<String, GatewayError>;

    /// Streaming invocation.
    async fn invoke_stream(&self, input: &str) -> Result<ChunkStream, GatewayError>;

    /// Release the underlying model resource.
    async fn destroy(&mut self);
}
