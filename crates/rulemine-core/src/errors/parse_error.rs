//! Extraction (parse) errors. All of them are file-scoped and recoverable:
//! the extractor keeps every rule closed before the failure.

use std::path::PathBuf;

use super::error_code::{self, RulemineErrorCode};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Unmatched {terminator} at {path}:{line}")]
    UnmatchedTerminator {
        path: PathBuf,
        line: u32,
        terminator: String,
    },

    #[error("Tree-sitter error parsing {path}: {message}")]
    TreeSitterError { path: PathBuf, message: String },

    #[error("Unsupported language: {extension}")]
    UnsupportedLanguage { extension: String },

    #[error("Partial parse of {path}: {message}")]
    PartialParse { path: PathBuf, message: String },
}

impl ParseError {
    /// The file the error is scoped to, when known.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::UnmatchedTerminator { path, .. }
            | Self::TreeSitterError { path, .. }
            | Self::PartialParse { path, .. } => Some(path),
            Self::UnsupportedLanguage { .. } => None,
        }
    }
}

impl RulemineErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnmatchedTerminator { .. } => error_code::UNMATCHED_TERMINATOR,
            Self::UnsupportedLanguage { .. } => error_code::UNSUPPORTED_LANGUAGE,
            _ => error_code::PARSE_ERROR,
        }
    }
}
