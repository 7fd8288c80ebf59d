//! Extraction configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MIN_CONFIDENCE, DEFAULT_SNIPPET_MAX_CHARS, DEFAULT_SQL_DIALECT};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Snippet cap in characters. Default: 500.
    pub snippet_max_chars: Option<usize>,
    /// Rules below this confidence are dropped after normalization. Default: 0.0.
    pub min_confidence: Option<f64>,
    /// SQL dialect label recorded in rule metadata. Default: "postgres".
    pub sql_dialect: Option<String>,
    /// Extract from application code (Python, Java, JS/TS). Default: true.
    pub app_code: Option<bool>,
}

impl ExtractionConfig {
    pub fn effective_snippet_max_chars(&self) -> usize {
        self.snippet_max_chars.unwrap_or(DEFAULT_SNIPPET_MAX_CHARS)
    }

    pub fn effective_min_confidence(&self) -> f64 {
        self.min_confidence.unwrap_or(DEFAULT_MIN_CONFIDENCE)
    }

    pub fn effective_sql_dialect(&self) -> &str {
        self.sql_dialect.as_deref().unwrap_or(DEFAULT_SQL_DIALECT)
    }

    pub fn effective_app_code(&self) -> bool {
        self.app_code.unwrap_or(true)
    }
}
