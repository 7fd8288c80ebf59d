//! The feature-provider capability.

use rulemine_core::errors::EnrichmentError;

/// Maps text to fixed-length numeric vectors.
///
/// Implementations are synchronous; the caller bounds each call with a
/// timeout and falls back to an offline provider on failure.
pub trait FeatureProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Configured vector length. Providers backed by a model may return
    /// the model's native length instead.
    fn dimensions(&self) -> usize;

    fn features(&self, text: &str) -> Result<Vec<f32>, EnrichmentError>;

    fn features_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EnrichmentError> {
        texts.iter().map(|t| self.features(t)).collect()
    }

    fn is_available(&self) -> bool;
}
