//! Trace-validation errors. These cover failures to read the document
//! itself; mismatches against the source tree are findings, not errors.

use std::path::PathBuf;

use super::error_code::{self, RulemineErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Cannot read document {path}: {source}")]
    DocumentIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed document at byte {position}: {message}")]
    MalformedXml { position: u64, message: String },

    #[error("Traceability source {rule_id} is missing attribute {attribute}")]
    MissingAttribute { rule_id: String, attribute: String },

    #[error("Invalid value {value:?} for attribute {attribute}")]
    InvalidAttribute { attribute: String, value: String },
}

impl RulemineErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }
}
