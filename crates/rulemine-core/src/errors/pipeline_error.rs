//! Pipeline errors and non-fatal error collection.

use super::error_code::{self, RulemineErrorCode};
use super::{
    ConfigError, EnrichmentError, GroupingError, ParseError, ScanError, SerializationError,
};

/// Errors that can occur during pipeline execution.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Enrichment error: {0}")]
    Enrichment(#[from] EnrichmentError),

    #[error("Grouping error: {0}")]
    Grouping(#[from] GroupingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline cancelled")]
    Cancelled,
}

impl RulemineErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Scan(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Enrichment(e) => e.error_code(),
            Self::Grouping(e) => e.error_code(),
            Self::Serialization(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a pipeline run that accumulates non-fatal errors.
/// Allows partial results to be returned even when some files fail.
#[derive(Debug, Default)]
pub struct PipelineResult<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the pipeline run.
    pub errors: Vec<PipelineError>,
}

impl<T: Default> PipelineResult<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: PipelineError) {
        self.errors.push(error);
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
