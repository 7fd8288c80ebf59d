//! Single-linkage grouping at a cosine similarity threshold.

use petgraph::unionfind::UnionFind;
use rulemine_core::errors::GroupingError;
use rulemine_core::model::Rule;

use super::provider::{renumber, GroupingProvider};
use super::vectors::{cosine, features_of};

pub struct ThresholdGrouping {
    threshold: f64,
}

impl ThresholdGrouping {
    pub fn new(threshold: f64) -> Result<Self, GroupingError> {
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(GroupingError::InvalidParameter {
                name: "similarity_threshold".to_string(),
                message: format!("{threshold} is outside [-1, 1]"),
            });
        }
        Ok(Self { threshold })
    }
}

impl GroupingProvider for ThresholdGrouping {
    fn name(&self) -> &str {
        "threshold"
    }

    fn needs_features(&self) -> bool {
        true
    }

    fn assign(&self, rules: &[Rule]) -> Result<Vec<usize>, GroupingError> {
        let points = features_of(rules)?;
        let mut links = UnionFind::<usize>::new(points.len());
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if cosine(points[i], points[j]) >= self.threshold {
                    links.union(i, j);
                }
            }
        }
        Ok(renumber(&links.into_labeling()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, RuleKind, SourceLocation};

    fn rule(i: u32, v: Vec<f32>) -> Rule {
        let kind = RuleKind::Validation {
            construct: Construct::Where,
            predicate: "x".to_string(),
        };
        let loc = SourceLocation::new("q.sql", i, i, String::new());
        let mut r = Rule::new(kind, String::new(), "x".to_string(), loc, 0.85);
        r.embedding = Some(v);
        r
    }

    #[test]
    fn chains_link_transitively() {
        // a~b and b~c at 0.9, a and c less similar: single linkage joins all.
        let rules = vec![
            rule(1, vec![1.0, 0.0]),
            rule(2, vec![0.8, 0.6]),
            rule(3, vec![0.28, 0.96]),
            rule(4, vec![-1.0, 0.0]),
        ];
        let labels = ThresholdGrouping::new(0.75).unwrap().assign(&rules).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1]);
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        assert!(ThresholdGrouping::new(1.5).is_err());
    }
}
