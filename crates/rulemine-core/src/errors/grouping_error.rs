//! Grouping-provider errors.

use super::error_code::{self, RulemineErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum GroupingError {
    #[error("Rule {rule_id} has no feature vector")]
    MissingFeatures { rule_id: String },

    #[error("Feature vectors disagree on dimensionality: {expected} vs {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid grouping parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Clustering failed: {message}")]
    Clustering { message: String },
}

impl RulemineErrorCode for GroupingError {
    fn error_code(&self) -> &'static str {
        error_code::GROUPING_ERROR
    }
}
