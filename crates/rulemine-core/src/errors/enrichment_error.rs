//! Feature-provider errors.

use super::error_code::{self, RulemineErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    /// The provider cannot serve requests right now. Callers switch to the
    /// offline provider.
    #[error("Feature provider unavailable: {provider}: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("Feature provider {provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("Feature provider {provider} returned {got} dimensions, expected {expected}")]
    DimensionMismatch {
        provider: String,
        expected: usize,
        got: usize,
    },

    #[error("Feature provider {provider} returned {got} vectors for {expected} rules")]
    CountMismatch {
        provider: String,
        expected: usize,
        got: usize,
    },

    #[error("Inference failed: {reason}")]
    InferenceFailed { reason: String },
}

impl RulemineErrorCode for EnrichmentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } | Self::Timeout { .. } => {
                error_code::ENRICHMENT_UNAVAILABLE
            }
            _ => error_code::ENRICHMENT_ERROR,
        }
    }
}
