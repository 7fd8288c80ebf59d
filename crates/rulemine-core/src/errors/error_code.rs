//! RulemineErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable, machine-readable
/// code alongside its human-readable message.
pub trait RulemineErrorCode {
    /// Returns the error code string (e.g., "PARSE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted coded string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const UNMATCHED_TERMINATOR: &str = "UNMATCHED_TERMINATOR";
pub const CANCELLED: &str = "CANCELLED";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const ENRICHMENT_UNAVAILABLE: &str = "ENRICHMENT_UNAVAILABLE";
pub const ENRICHMENT_ERROR: &str = "ENRICHMENT_ERROR";
pub const GROUPING_ERROR: &str = "GROUPING_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const PIPELINE_ERROR: &str = "PIPELINE_ERROR";
