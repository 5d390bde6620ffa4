//! Cancellation primitive shared between the controller and model calls.

use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag for one in-flight generation.
///
/// One token is issued per generation slot; every model call observes the
/// same token through an `Arc`. Cancellation is sticky: once triggered the
/// token never resets.
#[derive(Debug)]
pub struct CancelToken {
    cancelled: AtomicBool,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
