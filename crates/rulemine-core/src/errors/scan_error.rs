//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, RulemineErrorCode};

/// Errors that can occur while enumerating and reading files.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Root is not a directory: {path}")]
    InvalidRoot { path: PathBuf },

    #[error("Walk error: {message}")]
    WalkError { message: String },

    #[error("Scan cancelled")]
    Cancelled,

    #[error("File too large: {path} ({size} bytes, max {max})")]
    MaxFileSizeExceeded { path: PathBuf, size: u64, max: u64 },

    #[error("Unsupported encoding in {path}: {encoding}")]
    UnsupportedEncoding { path: PathBuf, encoding: String },
}

impl RulemineErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            _ => error_code::SCAN_ERROR,
        }
    }
}
