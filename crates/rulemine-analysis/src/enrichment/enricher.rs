//! Attaches feature vectors and domain concepts to rules.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError};
use rulemine_core::config::EnrichmentConfig;
use rulemine_core::errors::EnrichmentError;
use rulemine_core::model::Rule;

use super::concepts::tag_domain_concepts;
use super::hashing::HashingProvider;
use super::provider::FeatureProvider;
use super::registry::create_feature_provider;

/// What enrichment did, for run statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub provider: String,
    pub fell_back: bool,
    pub dimensions: usize,
}

pub struct Enricher {
    provider: Arc<dyn FeatureProvider>,
    fallback: HashingProvider,
    timeout: Duration,
    domain_mapping: bool,
}

/// Text a rule is featurized from. Tables, columns and the rule type are
/// tagged so the hashing provider can weight them apart from the expression.
pub fn feature_text(rule: &Rule) -> String {
    let mut text = format!("{} {}", rule.normalized_expression, rule.description);
    text.push_str(&format!(" type:{}", rule.rule_type().as_str()));
    for table in &rule.tables {
        text.push_str(&format!(" table:{table}"));
    }
    for column in &rule.columns {
        text.push_str(&format!(" column:{column}"));
    }
    text
}

impl Enricher {
    pub fn new(provider: Arc<dyn FeatureProvider>, config: &EnrichmentConfig) -> Self {
        Self {
            provider,
            fallback: HashingProvider::new(config.effective_dimensions()),
            timeout: Duration::from_millis(config.effective_timeout_ms()),
            domain_mapping: config.effective_domain_mapping(),
        }
    }

    pub fn from_config(config: &EnrichmentConfig) -> Self {
        Self::new(Arc::from(create_feature_provider(config)), config)
    }

    /// Run the provider on a worker thread, giving up after the timeout.
    /// A late answer is discarded.
    fn bounded_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EnrichmentError> {
        let (tx, rx) = bounded(1);
        let provider = Arc::clone(&self.provider);
        std::thread::spawn(move || {
            let _ = tx.send(provider.features_batch(&texts));
        });
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(EnrichmentError::Timeout {
                provider: self.provider.name().to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(EnrichmentError::InferenceFailed {
                reason: format!("{} worker exited without a result", self.provider.name()),
            }),
        }
    }

    /// Set `embedding` on every rule, and `domain_concepts` when enabled.
    /// Provider failures switch the whole batch to the hashing provider so
    /// all vectors share one space.
    pub fn enrich(&self, rules: &mut [Rule]) -> EnrichmentReport {
        if self.domain_mapping {
            tag_domain_concepts(rules);
        }
        if rules.is_empty() {
            return EnrichmentReport {
                provider: self.provider.name().to_string(),
                fell_back: false,
                dimensions: self.provider.dimensions(),
            };
        }
        let texts: Vec<String> = rules.iter().map(feature_text).collect();

        let primary = self.bounded_batch(texts.clone()).and_then(|vectors| {
            if vectors.len() != texts.len() {
                return Err(EnrichmentError::CountMismatch {
                    provider: self.provider.name().to_string(),
                    expected: texts.len(),
                    got: vectors.len(),
                });
            }
            let dims = vectors.first().map_or(0, Vec::len);
            match vectors.iter().find(|v| v.len() != dims || dims == 0) {
                Some(bad) => Err(EnrichmentError::DimensionMismatch {
                    provider: self.provider.name().to_string(),
                    expected: dims,
                    got: bad.len(),
                }),
                None => Ok(vectors),
            }
        });

        let (vectors, provider, fell_back) = match primary {
            Ok(v) => (v, self.provider.name().to_string(), false),
            Err(e) => {
                tracing::warn!(error = %e, "feature provider failed, using hashing fallback");
                let v = texts
                    .iter()
                    .map(|t| self.fallback.features(t).unwrap_or_default())
                    .collect();
                (v, self.fallback.name().to_string(), true)
            }
        };

        let dimensions = vectors.first().map_or(0, Vec::len);
        for (rule, vector) in rules.iter_mut().zip(vectors) {
            rule.embedding = Some(vector);
        }
        tracing::info!(provider = %provider, rules = rules.len(), dimensions, fell_back, "enrichment complete");
        EnrichmentReport {
            provider,
            fell_back,
            dimensions,
        }
    }
}
