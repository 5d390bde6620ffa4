//! Generation pipeline errors.

use thiserror::Error;

use super::{ExtractError, GatewayError};
use crate::capability::CapabilityKind;
use crate::types::ArtifactKind;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("could not parse model output for {0}")]
    ParseFailure(ArtifactKind),

    #[error("no capability registered for {0}")]
    NoCapability(CapabilityKind),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl PipelineError {
    /// Whether the underlying cause is cancellation. Cancellation is a
    /// terminal non-error outcome, never surfaced as a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PipelineError::Gateway(e) if e.is_cancellation())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_cancellation_passes_through() {
        let err = PipelineError::from(GatewayError::Cancelled);
        assert!(err.is_cancellation());
    }

    #[test]
    fn test_parse_failure_is_not_cancellation() {
        let err = PipelineError::ParseFailure(ArtifactKind::Quiz);
        assert!(!err.is_cancellation());
        assert!(err.to_string().contains("quiz"));
    }
}
