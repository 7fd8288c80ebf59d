//! CLI-specific error types
//!
//! Every CLI error ends the process with status 2.

use std::fmt;
use std::io;

use rulemine_core::errors::{
    ConfigError, PipelineError, RulemineErrorCode, SerializationError, ValidationError,
};

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration could not be loaded or is invalid
    ConfigError,
    /// Reading or writing a file failed
    IoError,
    /// The analysis run itself failed
    AnalysisFailed,
    /// One or more output formats could not be produced
    SerializationFailed,
    /// The document to validate could not be read
    ValidationFailed,
    /// Arguments are valid individually but not together
    UsageError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "RULEMINE_CLI_CONFIG_ERROR",
            Self::IoError => "RULEMINE_CLI_IO_ERROR",
            Self::AnalysisFailed => "RULEMINE_CLI_ANALYSIS_FAILED",
            Self::SerializationFailed => "RULEMINE_CLI_SERIALIZATION_FAILED",
            Self::ValidationFailed => "RULEMINE_CLI_VALIDATION_FAILED",
            Self::UsageError => "RULEMINE_CLI_USAGE_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::UsageError, msg)
    }

    pub fn serialization_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SerializationFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.coded_string())
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Config(inner) => inner.into(),
            other => Self::new(CliErrorCode::AnalysisFailed, other.coded_string()),
        }
    }
}

impl From<SerializationError> for CliError {
    fn from(e: SerializationError) -> Self {
        Self::serialization_failed(e.coded_string())
    }
}

impl From<ValidationError> for CliError {
    fn from(e: ValidationError) -> Self {
        Self::new(CliErrorCode::ValidationFailed, e.coded_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_code() {
        let e = CliError::usage("--out is required");
        assert_eq!(e.to_string(), "RULEMINE_CLI_USAGE_ERROR: --out is required");
        assert_eq!(e.code(), &CliErrorCode::UsageError);
    }

    #[test]
    fn pipeline_errors_map_by_cause() {
        let e: CliError = PipelineError::Cancelled.into();
        assert_eq!(e.code(), &CliErrorCode::AnalysisFailed);
        assert!(e.message.contains("CANCELLED"));

        let config = ConfigError::ValidationFailed {
            field: "grouping.n_groups".to_string(),
            message: "must be greater than 0".to_string(),
        };
        let e: CliError = PipelineError::Config(config).into();
        assert_eq!(e.code(), &CliErrorCode::ConfigError);
    }
}
