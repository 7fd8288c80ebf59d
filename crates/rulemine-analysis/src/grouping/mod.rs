//! Grouping: labels from a [`GroupingProvider`], then named groups.

pub mod density;
pub mod kmeans;
pub mod labeling;
pub mod provider;
pub mod structural;
pub mod threshold;
pub mod vectors;

use rulemine_core::config::GroupingConfig;
use rulemine_core::errors::GroupingError;
use rulemine_core::model::{Rule, RuleGroup};

pub use density::DensityGrouping;
pub use kmeans::KMeansGrouping;
pub use labeling::build_groups;
pub use provider::GroupingProvider;
pub use structural::StructuralGrouping;
pub use threshold::ThresholdGrouping;

/// Names accepted by `grouping.method`.
pub const GROUPING_METHODS: &[&str] = &["kmeans", "density", "threshold", "structural"];

/// Build the configured grouping provider. Unknown methods fall back to
/// structural grouping with a warning.
pub fn create_grouping_provider(
    config: &GroupingConfig,
) -> Result<Box<dyn GroupingProvider>, GroupingError> {
    Ok(match config.effective_method() {
        "kmeans" => Box::new(KMeansGrouping::new(
            config.effective_n_groups(),
            config.effective_seed(),
        )?),
        "density" => Box::new(DensityGrouping::new(config.effective_min_cluster_size())?),
        "threshold" => Box::new(ThresholdGrouping::new(
            config.effective_similarity_threshold(),
        )?),
        "structural" => Box::new(StructuralGrouping),
        other => {
            tracing::warn!(method = other, "unknown grouping method, using structural");
            Box::new(StructuralGrouping)
        }
    })
}

/// Group `rules` with `provider`. Feature-based methods fall back to
/// structural grouping when features are missing or inconsistent.
pub fn group_rules(rules: &[Rule], provider: &dyn GroupingProvider) -> Vec<RuleGroup> {
    if rules.is_empty() {
        return Vec::new();
    }
    let labels = match provider.assign(rules) {
        Ok(labels) => labels,
        Err(e) => {
            tracing::warn!(method = provider.name(), error = %e, "grouping failed, using structural");
            match StructuralGrouping.assign(rules) {
                Ok(labels) => labels,
                Err(_) => vec![0; rules.len()],
            }
        }
    };
    let groups = build_groups(rules, &labels);
    tracing::info!(method = provider.name(), groups = groups.len(), rules = rules.len(), "grouping complete");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, RuleKind, SourceLocation};

    #[test]
    fn registry_resolves_methods() {
        for method in GROUPING_METHODS {
            let config = GroupingConfig {
                method: Some(method.to_string()),
                ..Default::default()
            };
            assert_eq!(create_grouping_provider(&config).unwrap().name(), *method);
        }
        let unknown = GroupingConfig {
            method: Some("dbscan".to_string()),
            ..Default::default()
        };
        assert_eq!(create_grouping_provider(&unknown).unwrap().name(), "structural");
    }

    #[test]
    fn kmeans_without_features_falls_back() {
        let kind = RuleKind::Validation {
            construct: Construct::Where,
            predicate: "a".to_string(),
        };
        let loc = SourceLocation::new("q.sql", 1, 1, String::new());
        let rules = vec![Rule::new(kind, String::new(), "a".to_string(), loc, 0.8)];
        let provider = create_grouping_provider(&GroupingConfig::default()).unwrap();
        let groups = group_rules(&rules, provider.as_ref());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rules, vec![0]);
    }
}
