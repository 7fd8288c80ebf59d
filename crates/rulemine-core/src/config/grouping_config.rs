//! Grouping configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_GROUPING_METHOD, DEFAULT_GROUPING_SEED, DEFAULT_GROUP_COUNT,
    DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_SIMILARITY_THRESHOLD,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GroupingConfig {
    /// "kmeans", "density", "threshold", or "structural". Default: "kmeans".
    pub method: Option<String>,
    /// Target group count for k-means. Default: 5.
    pub n_groups: Option<usize>,
    /// Cosine similarity linkage threshold. Default: 0.75.
    pub similarity_threshold: Option<f64>,
    /// Smallest dense cluster for the density method. Default: 2.
    pub min_cluster_size: Option<usize>,
    /// Seed for deterministic initialisation. Default: 42.
    pub seed: Option<u64>,
}

impl GroupingConfig {
    pub fn effective_method(&self) -> &str {
        self.method.as_deref().unwrap_or(DEFAULT_GROUPING_METHOD)
    }

    pub fn effective_n_groups(&self) -> usize {
        self.n_groups.unwrap_or(DEFAULT_GROUP_COUNT)
    }

    pub fn effective_similarity_threshold(&self) -> f64 {
        self.similarity_threshold
            .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD)
    }

    pub fn effective_min_cluster_size(&self) -> usize {
        self.min_cluster_size.unwrap_or(DEFAULT_MIN_CLUSTER_SIZE)
    }

    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_GROUPING_SEED)
    }
}
