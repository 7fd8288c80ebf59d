//! Feature-provider selection by configuration.

use std::time::Duration;

use rulemine_core::config::EnrichmentConfig;

use super::hashing::HashingProvider;
use super::ollama::OllamaProvider;
use super::provider::FeatureProvider;

/// Names accepted by `enrichment.provider`.
pub const FEATURE_PROVIDERS: &[&str] = &["hashing", "ollama"];

/// Build the configured provider. Unknown names and unreachable servers
/// fall back to [`HashingProvider`] with a warning.
pub fn create_feature_provider(config: &EnrichmentConfig) -> Box<dyn FeatureProvider> {
    let dims = config.effective_dimensions();
    match config.effective_provider() {
        "hashing" => Box::new(HashingProvider::new(dims)),
        "ollama" => {
            let timeout = Duration::from_millis(config.effective_timeout_ms());
            match OllamaProvider::new(
                config.effective_ollama_url(),
                config.effective_ollama_model(),
                dims,
                timeout,
            ) {
                Ok(p) if p.is_available() => {
                    tracing::info!(url = config.effective_ollama_url(), "using ollama feature provider");
                    Box::new(p)
                }
                Ok(_) => {
                    tracing::warn!(
                        url = config.effective_ollama_url(),
                        "ollama unreachable, falling back to hashing provider"
                    );
                    Box::new(HashingProvider::new(dims))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ollama client setup failed, falling back to hashing provider");
                    Box::new(HashingProvider::new(dims))
                }
            }
        }
        other => {
            tracing::warn!(provider = other, "unknown feature provider, using hashing");
            Box::new(HashingProvider::new(dims))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back() {
        let config = EnrichmentConfig {
            provider: Some("word2vec".to_string()),
            dimensions: Some(16),
            ..Default::default()
        };
        let p = create_feature_provider(&config);
        assert_eq!(p.name(), "hashing");
        assert_eq!(p.dimensions(), 16);
    }

    #[test]
    fn unreachable_ollama_falls_back() {
        let config = EnrichmentConfig {
            provider: Some("ollama".to_string()),
            ollama_url: Some("http://127.0.0.1:9".to_string()),
            timeout_ms: Some(200),
            ..Default::default()
        };
        assert_eq!(create_feature_provider(&config).name(), "hashing");
    }
}
