//! Enrichment: feature vectors for grouping, and domain concept tags.

pub mod concepts;
pub mod enricher;
pub mod hashing;
pub mod ollama;
pub mod provider;
pub mod registry;

pub use concepts::{domain_concepts, tag_domain_concepts, DOMAIN_CONCEPTS};
pub use enricher::{feature_text, EnrichmentReport, Enricher};
pub use hashing::HashingProvider;
pub use ollama::OllamaProvider;
pub use provider::FeatureProvider;
pub use registry::{create_feature_provider, FEATURE_PROVIDERS};
