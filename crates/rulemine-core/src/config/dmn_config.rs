//! DMN output configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DEFINITIONS_NAME, DEFAULT_SNIPPET_MAX_CHARS, DEFAULT_TRACE_NAMESPACE,
    GENERATOR_NAME,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DmnConfig {
    /// Namespace of the traceability extension elements.
    pub namespace: Option<String>,
    /// `name` attribute of the `definitions` root.
    pub definitions_name: Option<String>,
    /// `exporter` attribute of the `definitions` root.
    pub exporter: Option<String>,
    /// Snippet cap inside the extension block. Default: 500.
    pub snippet_max_chars: Option<usize>,
    /// Emit `trace:snippet` children. Default: true.
    pub include_snippets: Option<bool>,
    /// Indent the XML output. Default: true.
    pub pretty_print: Option<bool>,
}

impl DmnConfig {
    pub fn effective_namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_TRACE_NAMESPACE)
    }

    pub fn effective_definitions_name(&self) -> &str {
        self.definitions_name
            .as_deref()
            .unwrap_or(DEFAULT_DEFINITIONS_NAME)
    }

    pub fn effective_exporter(&self) -> &str {
        self.exporter.as_deref().unwrap_or(GENERATOR_NAME)
    }

    pub fn effective_snippet_max_chars(&self) -> usize {
        self.snippet_max_chars.unwrap_or(DEFAULT_SNIPPET_MAX_CHARS)
    }

    pub fn effective_include_snippets(&self) -> bool {
        self.include_snippets.unwrap_or(true)
    }

    pub fn effective_pretty_print(&self) -> bool {
        self.pretty_print.unwrap_or(true)
    }
}
