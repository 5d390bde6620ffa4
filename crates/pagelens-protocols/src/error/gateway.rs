//! Model gateway errors.

use thiserror::Error;

use crate::capability::CapabilityKind;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("capability unavailable: {0}")]
    ModelUnavailable(CapabilityKind),

    #[error("model download for {0} requires a user gesture")]
    ModelDownloadRequired(CapabilityKind),

    #[error("input too large: {chars} characters")]
    InputTooLarge { chars: usize },

    #[error("generation cancelled")]
    Cancelled,

    #[error("session creation failed: {0}")]
    SessionCreation(String),

    #[error("invocation failed: {0}")]
    Invocation(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("translation failed: {0}")]
    TranslationFailed(String),
}

impl GatewayError {
    /// Whether this error signals cancellation.
    ///
    /// The structured [`GatewayError::Cancelled`] variant is checked
    /// first; providers are inconsistent about how they signal an abort,
    /// so the message text is inspected as a fallback.
    pub fn is_cancellation(&self) -> bool {
        if matches!(self, GatewayError::Cancelled) {
            return true;
        }
        let message = self.to_string().to_ascii_lowercase();
        message.contains("abort") || message.contains("cancel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_variant_is_cancellation() {
        assert!(GatewayError::Cancelled.is_cancellation());
    }

    #[test]
    fn test_message_sniffing_fallback() {
        assert!(GatewayError::Invocation("request aborted by host".to_string()).is_cancellation());
        assert!(GatewayError::StreamError("Cancelled mid-stream".to_string()).is_cancellation());
        assert!(!GatewayError::Invocation("out of memory".to_string()).is_cancellation());
    }

    #[test]
    fn test_too_large_message() {
        let err = GatewayError::InputTooLarge { chars: 40_000 };
        assert!(err.to_string().contains("40000"));
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_unavailable_names_capability() {
        let err = GatewayError::ModelUnavailable(CapabilityKind::Translator);
        assert!(err.to_string().contains("translator"));
    }
}
