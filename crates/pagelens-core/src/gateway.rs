//! Uniform gateway over the three capability providers.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use pagelens_protocols::capability::{
    Availability, CapabilityKind, CapabilityProvider, ChunkStream, ModelSession, SessionOptions,
};
use pagelens_protocols::error::GatewayError;
use pagelens_protocols::types::LanguageCode;

/// Registry and front door for capability providers.
///
/// Holds at most one provider per capability kind. Availability probes
/// never error; session creation enforces the user-gesture download
/// gate before touching the provider.
pub struct ModelGateway {
    providers: RwLock<HashMap<CapabilityKind, Arc<dyn CapabilityProvider>>>,
}

impl ModelGateway {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a provider, replacing any prior one of the same kind.
    pub fn register(&self, provider: Arc<dyn CapabilityProvider>) {
        let kind = provider.kind();
        self.providers.write().insert(kind, provider);
        debug!(capability = %kind, "registered capability provider");
    }

    fn provider(&self, kind: CapabilityKind) -> Option<Arc<dyn CapabilityProvider>> {
        self.providers.read().get(&kind).cloned()
    }

    /// Probe a capability's availability. Never errors: a missing
    /// provider or a failed probe both report `Unavailable`.
    pub async fn check_availability(
        &self,
        kind: CapabilityKind,
        lang_hint: Option<LanguageCode>,
    ) -> Availability {
        let Some(provider) = self.provider(kind) else {
            return Availability::Unavailable;
        };
        match provider.availability(lang_hint).await {
            Ok(availability) => availability,
            Err(e) => {
                warn!(capability = %kind, error = %e, "availability probe failed");
                Availability::Unavailable
            }
        }
    }

    /// Create a session for a capability.
    ///
    /// A `Downloadable` capability outside a user-gesture call stack
    /// fails with [`GatewayError::ModelDownloadRequired`]; callers in
    /// background flows degrade instead of surfacing this.
    pub async fn create_session(
        &self,
        kind: CapabilityKind,
        options: SessionOptions,
    ) -> Result<SessionHandle, GatewayError> {
        let provider = self
            .provider(kind)
            .ok_or(GatewayError::ModelUnavailable(kind))?;

        let lang_hint = options.target_language.or(options.source_language);
        match provider.availability(lang_hint).await.unwrap_or(Availability::Unavailable) {
            Availability::Unavailable => return Err(GatewayError::ModelUnavailable(kind)),
            Availability::Downloadable if !options.user_gesture => {
                return Err(GatewayError::ModelDownloadRequired(kind));
            }
            _ => {}
        }

        let session = provider.create_session(options).await?;
        debug!(capability = %kind, "created model session");
        Ok(SessionHandle::new(kind, session))
    }
}

impl Default for ModelGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard around a created session enforcing exactly-once release.
///
/// Every exit path of a generation must call [`SessionHandle::destroy`];
/// a second destroy is a no-op and invoking after destroy is an error.
pub struct SessionHandle {
    kind: CapabilityKind,
    inner: Option<Box<dyn ModelSession>>,
}

impl SessionHandle {
    fn new(kind: CapabilityKind, session: Box<dyn ModelSession>) -> Self {
        Self {
            kind,
            inner: Some(session),
        }
    }

    /// Capability kind this session belongs to.
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    fn session(&self) -> Result<&dyn ModelSession, GatewayError> {
        self.inner
            .as_deref()
            .ok_or_else(|| GatewayError::Invocation("session already destroyed".to_string()))
    }

    /// One-shot invocation.
    pub async fn invoke(&self, input: &str) -> Result<String, GatewayError> {
        self.session()?.invoke(input).await
    }

    /// Streaming invocation.
    pub async fn invoke_stream(&self, input: &str) -> Result<ChunkStream, GatewayError> {
        self.session()?.invoke_stream(input).await
    }

    /// Release the underlying model resource. Idempotent.
    pub async fn destroy(&mut self) {
        if let Some(mut session) = self.inner.take() {
            session.destroy().await;
            debug!(capability = %self.kind, "destroyed model session");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.inner.is_some() {
            // destroy() is async and cannot run here; this indicates a
            // missed release on some exit path.
            warn!(capability = %self.kind, "model session dropped without destroy");
        }
    }
}
