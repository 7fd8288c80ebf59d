//! Feature provider backed by a local Ollama server's embedding endpoint.

use std::time::Duration;

use rulemine_core::errors::EnrichmentError;
use serde::{Deserialize, Serialize};

use super::provider::FeatureProvider;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaProvider {
    pub fn new(
        base_url: &str,
        model: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Unavailable {
                provider: "ollama".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    fn unavailable(&self, reason: impl ToString) -> EnrichmentError {
        EnrichmentError::Unavailable {
            provider: format!("ollama ({})", self.base_url),
            reason: reason.to_string(),
        }
    }
}

impl FeatureProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn features(&self, text: &str) -> Result<Vec<f32>, EnrichmentError> {
        let mut batch = self.features_batch(&[text.to_string()])?;
        batch.pop().ok_or_else(|| EnrichmentError::InferenceFailed {
            reason: "empty embedding response".to_string(),
        })
    }

    fn features_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EnrichmentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .map_err(|e| self.unavailable(e))?;
        if !response.status().is_success() {
            return Err(self.unavailable(format!("HTTP {}", response.status())));
        }
        let body: EmbedResponse = response.json().map_err(|e| EnrichmentError::InferenceFailed {
            reason: e.to_string(),
        })?;
        if body.embeddings.len() != texts.len() {
            return Err(EnrichmentError::InferenceFailed {
                reason: format!(
                    "requested {} embeddings, received {}",
                    texts.len(),
                    body.embeddings.len()
                ),
            });
        }
        Ok(body.embeddings)
    }

    fn is_available(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
