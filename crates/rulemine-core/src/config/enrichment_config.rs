//! Enrichment (feature provider) configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENRICHMENT_TIMEOUT_MS, DEFAULT_FEATURE_DIMENSIONS, DEFAULT_FEATURE_PROVIDER,
    DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Enable the enrichment stage at all. Default: true.
    pub enabled: Option<bool>,
    /// Provider name: "hashing" or "ollama". Default: "hashing".
    pub provider: Option<String>,
    /// Feature vector dimensionality. Default: 128.
    pub dimensions: Option<usize>,
    /// Per-call timeout in milliseconds. Default: 5000.
    pub timeout_ms: Option<u64>,
    /// Ollama base URL. Default: http://localhost:11434.
    pub ollama_url: Option<String>,
    /// Ollama embedding model. Default: "nomic-embed-text".
    pub ollama_model: Option<String>,
    /// Tag rules with business domain concepts. Default: true.
    pub domain_mapping: Option<bool>,
}

impl EnrichmentConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_provider(&self) -> &str {
        self.provider.as_deref().unwrap_or(DEFAULT_FEATURE_PROVIDER)
    }

    pub fn effective_dimensions(&self) -> usize {
        self.dimensions.unwrap_or(DEFAULT_FEATURE_DIMENSIONS)
    }

    pub fn effective_timeout_ms(&self) -> u64 {
        self.timeout_ms.unwrap_or(DEFAULT_ENRICHMENT_TIMEOUT_MS)
    }

    pub fn effective_ollama_url(&self) -> &str {
        self.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    pub fn effective_ollama_model(&self) -> &str {
        self.ollama_model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL)
    }

    pub fn effective_domain_mapping(&self) -> bool {
        self.domain_mapping.unwrap_or(true)
    }
}
