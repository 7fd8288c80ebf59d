//! Density-based grouping with HDBSCAN.
//!
//! Vectors are L2-normalized first, so Euclidean distance orders pairs the
//! same way cosine similarity does. Noise points are not dropped: each one
//! becomes a singleton group and still reaches a decision table.

use hdbscan::{Hdbscan, HdbscanHyperParams};
use rulemine_core::errors::GroupingError;
use rulemine_core::model::Rule;

use super::provider::{renumber, GroupingProvider};
use super::vectors::{features_of, unit};

pub struct DensityGrouping {
    min_cluster_size: usize,
}

impl DensityGrouping {
    pub fn new(min_cluster_size: usize) -> Result<Self, GroupingError> {
        if min_cluster_size < 2 {
            return Err(GroupingError::InvalidParameter {
                name: "min_cluster_size".to_string(),
                message: "must be at least 2".to_string(),
            });
        }
        Ok(Self { min_cluster_size })
    }
}

impl GroupingProvider for DensityGrouping {
    fn name(&self) -> &str {
        "density"
    }

    fn needs_features(&self) -> bool {
        true
    }

    fn assign(&self, rules: &[Rule]) -> Result<Vec<usize>, GroupingError> {
        let points = features_of(rules)?;
        if points.len() < self.min_cluster_size {
            return Ok((0..points.len()).collect());
        }
        let features: Vec<Vec<f32>> = points.iter().map(|p| unit(p)).collect();

        let hyper_params = HdbscanHyperParams::builder()
            .min_cluster_size(self.min_cluster_size)
            .min_samples(1)
            .build();
        let labels = Hdbscan::new(&features, hyper_params)
            .cluster()
            .map_err(|e| GroupingError::Clustering {
                message: format!("{e:?}"),
            })?;

        // Noise (-1) gets a label past every cluster id, one per point.
        let clusters = labels.iter().copied().max().map_or(0, |m| (m + 1).max(0) as usize);
        let mut next_noise = clusters;
        let raw: Vec<usize> = labels
            .iter()
            .map(|&l| {
                if l < 0 {
                    next_noise += 1;
                    next_noise - 1
                } else {
                    l as usize
                }
            })
            .collect();
        tracing::debug!(
            clusters,
            noise = next_noise - clusters,
            "density clustering complete"
        );
        Ok(renumber(&raw))
    }
}
