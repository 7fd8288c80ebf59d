//! Output serialization errors. Fatal for one format only.

use super::error_code::{self, RulemineErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("XML write error in {format}: {message}")]
    Xml { format: String, message: String },

    #[error("JSON error: {message}")]
    Json { message: String },

    #[error("Output is not valid UTF-8 for {format}: {message}")]
    Encoding { format: String, message: String },

    #[error("Model cannot be rendered as {format}: {message}")]
    InvalidModel { format: String, message: String },

    #[error("Unknown output format: {format}")]
    UnknownFormat { format: String },

    #[error("Failed to write {path}: {message}")]
    Io { path: String, message: String },
}

impl SerializationError {
    /// The format name this error belongs to.
    pub fn format(&self) -> &str {
        match self {
            Self::Xml { format, .. }
            | Self::Encoding { format, .. }
            | Self::InvalidModel { format, .. } => format,
            Self::Json { .. } => "json",
            Self::UnknownFormat { format } => format,
            Self::Io { .. } => "io",
        }
    }
}

impl RulemineErrorCode for SerializationError {
    fn error_code(&self) -> &'static str {
        error_code::SERIALIZATION_ERROR
    }
}
