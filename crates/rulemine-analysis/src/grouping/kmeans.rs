//! Seeded k-means++ over cosine similarity.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rulemine_core::errors::GroupingError;
use rulemine_core::model::Rule;

use super::provider::{renumber, GroupingProvider};
use super::vectors::{cosine, features_of, mean};

const MAX_ITERATIONS: usize = 100;

pub struct KMeansGrouping {
    k: usize,
    seed: u64,
}

impl KMeansGrouping {
    pub fn new(k: usize, seed: u64) -> Result<Self, GroupingError> {
        if k == 0 {
            return Err(GroupingError::InvalidParameter {
                name: "n_groups".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(Self { k, seed })
    }

    /// k-means++ seeding with distance `1 - cosine`.
    fn initial_centers(&self, points: &[&[f32]], k: usize) -> Vec<Vec<f32>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let first = rng.gen_range(0..points.len());
        let mut chosen = vec![first];
        while chosen.len() < k {
            let weights: Vec<f64> = points
                .iter()
                .map(|p| {
                    chosen
                        .iter()
                        .map(|&c| (1.0 - cosine(p, points[c])).max(0.0))
                        .fold(f64::INFINITY, f64::min)
                        .powi(2)
                })
                .collect();
            let total: f64 = weights.iter().sum();
            let next = if total <= f64::EPSILON {
                // Everything coincides with a center; take the first unused point.
                match (0..points.len()).find(|i| !chosen.contains(i)) {
                    Some(i) => i,
                    None => break,
                }
            } else {
                let mut target = rng.gen::<f64>() * total;
                let mut pick = weights.len() - 1;
                for (i, w) in weights.iter().enumerate() {
                    if *w > 0.0 && target < *w {
                        pick = i;
                        break;
                    }
                    target -= w;
                }
                pick
            };
            chosen.push(next);
        }
        chosen.into_iter().map(|i| points[i].to_vec()).collect()
    }
}

fn nearest(point: &[f32], centers: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_sim = f64::NEG_INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let sim = cosine(point, c);
        if sim > best_sim {
            best = i;
            best_sim = sim;
        }
    }
    best
}

impl GroupingProvider for KMeansGrouping {
    fn name(&self) -> &str {
        "kmeans"
    }

    fn needs_features(&self) -> bool {
        true
    }

    fn assign(&self, rules: &[Rule]) -> Result<Vec<usize>, GroupingError> {
        if rules.is_empty() {
            return Ok(Vec::new());
        }
        let points = features_of(rules)?;
        let k = self.k.min(points.len());
        let mut centers = self.initial_centers(&points, k);
        let mut labels: Vec<usize> = points.iter().map(|p| nearest(p, &centers)).collect();

        for iteration in 0..MAX_ITERATIONS {
            for (c, center) in centers.iter_mut().enumerate() {
                let members = points
                    .iter()
                    .zip(&labels)
                    .filter(|(_, &l)| l == c)
                    .map(|(p, _)| *p);
                if let Some(m) = mean(members) {
                    *center = m;
                }
            }
            let next: Vec<usize> = points.iter().map(|p| nearest(p, &centers)).collect();
            if next == labels {
                tracing::debug!(iterations = iteration + 1, k, "k-means converged");
                break;
            }
            labels = next;
        }
        Ok(renumber(&labels))
    }
}
