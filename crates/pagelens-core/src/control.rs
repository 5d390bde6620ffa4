//! Per-slot cancellation and concurrency control.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use pagelens_protocols::cancel::CancelToken;
use pagelens_protocols::types::ArtifactKind;

/// Enforces at-most-one-active-generation per artifact slot.
///
/// Each slot holds at most one live token. Beginning a generation for a
/// slot that is already running cancels the existing token first, so
/// the in-flight model call stops and releases its session, then issues
/// a fresh token for the new run.
pub struct SlotController {
    slots: Mutex<HashMap<ArtifactKind, Arc<CancelToken>>>,
}

impl SlotController {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Begin a generation for a slot, cancelling any prior one.
    pub fn begin(&self, kind: ArtifactKind) -> Arc<CancelToken> {
        let mut slots = self.slots.lock();
        if let Some(prev) = slots.get(&kind) {
            debug!(artifact = %kind, "cancelling prior generation for slot");
            prev.cancel();
        }
        let token = Arc::new(CancelToken::new());
        slots.insert(kind, token.clone());
        token
    }

    /// Cancel the slot's in-flight generation, if any.
    pub fn cancel(&self, kind: ArtifactKind) {
        if let Some(token) = self.slots.lock().get(&kind) {
            token.cancel();
        }
    }

    /// Cancel every in-flight generation (tab switch, navigation).
    pub fn cancel_all(&self) {
        for token in self.slots.lock().values() {
            token.cancel();
        }
    }

    /// Mark a generation settled. Clears the slot only when `token` is
    /// still the slot's current token, so a finished run cannot clobber
    /// the slot of a restart that superseded it.
    pub fn finish(&self, kind: ArtifactKind, token: &Arc<CancelToken>) {
        let mut slots = self.slots.lock();
        if let Some(current) = slots.get(&kind) {
            if Arc::ptr_eq(current, token) {
                slots.remove(&kind);
            }
        }
    }

    /// Whether the slot has an in-flight, uncancelled generation.
    pub fn is_running(&self, kind: ArtifactKind) -> bool {
        self.slots
            .lock()
            .get(&kind)
            .is_some_and(|token| !token.is_cancelled())
    }
}

impl Default for SlotController {
    fn default() -> Self {
        Self::new()
    }
}
