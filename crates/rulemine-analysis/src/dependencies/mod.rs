//! Dependency inference between rule groups.
//!
//! `shared_table` and `shared_column` edges carry the Jaccard index of the
//! two groups' sets and point from the lower-numbered group to the higher.
//! `temporal` edges run from a group with BEFORE-trigger rules to a group
//! with AFTER-trigger rules on a common table.

use rulemine_core::config::DependencyConfig;
use rulemine_core::model::{DependencyKind, Rule, RuleDependency, RuleGroup, TriggerTiming};
use rulemine_core::types::collections::BTreeSet;

pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let inter = a.intersection(b).count();
    if inter == 0 {
        return 0.0;
    }
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}

pub fn infer_dependencies(
    groups: &[RuleGroup],
    rules: &[Rule],
    config: &DependencyConfig,
) -> Vec<RuleDependency> {
    let min = config.effective_min_strength();
    let tables: Vec<BTreeSet<String>> = groups.iter().map(|g| g.tables(rules)).collect();
    let columns: Vec<BTreeSet<String>> = groups.iter().map(|g| g.columns(rules)).collect();
    let mut edges = Vec::new();

    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            for (kind, sets) in [
                (DependencyKind::SharedTable, &tables),
                (DependencyKind::SharedColumn, &columns),
            ] {
                let strength = jaccard(&sets[i], &sets[j]);
                if strength > 0.0 && strength >= min {
                    edges.push(RuleDependency {
                        source_group_id: groups[i].id.clone(),
                        target_group_id: groups[j].id.clone(),
                        kind,
                        strength,
                    });
                }
            }
        }
    }

    if config.effective_temporal() {
        let before: Vec<BTreeSet<String>> = groups
            .iter()
            .map(|g| g.trigger_tables(rules, TriggerTiming::Before))
            .collect();
        let after: Vec<BTreeSet<String>> = groups
            .iter()
            .map(|g| g.trigger_tables(rules, TriggerTiming::After))
            .collect();
        for i in 0..groups.len() {
            for j in 0..groups.len() {
                if i != j && !before[i].is_disjoint(&after[j]) {
                    edges.push(RuleDependency {
                        source_group_id: groups[i].id.clone(),
                        target_group_id: groups[j].id.clone(),
                        kind: DependencyKind::Temporal,
                        strength: 1.0,
                    });
                }
            }
        }
    }

    tracing::info!(groups = groups.len(), dependencies = edges.len(), "dependency inference complete");
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, RuleKind, SourceLocation};

    fn rule(line: u32, tables: &[&str], columns: &[&str], timing: Option<TriggerTiming>) -> Rule {
        let mut kind = RuleKind::Validation {
            construct: Construct::Where,
            predicate: "p".to_string(),
        };
        if let Some(t) = timing {
            kind = kind.into_trigger("trg".to_string(), Some(t), tables.first().map(|s| s.to_string()));
        }
        let loc = SourceLocation::new("a.sql", line, line, String::new());
        let mut r = Rule::new(kind, String::new(), "p".to_string(), loc, 0.85);
        r.tables = tables.iter().map(|s| s.to_string()).collect();
        r.columns = columns.iter().map(|s| s.to_string()).collect();
        r
    }

    fn group(id: &str, rules: Vec<usize>) -> RuleGroup {
        RuleGroup {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: String::new(),
            rules,
            confidence: 1.0,
            centroid: None,
        }
    }

    #[test]
    fn jaccard_values() {
        let a: BTreeSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["y", "z"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(jaccard(&a, &BTreeSet::new()), 0.0);
    }

    #[test]
    fn shared_table_and_column_edges_stay_separate() {
        let rules = vec![
            rule(1, &["orders"], &["total"], None),
            rule(2, &["orders"], &["total", "qty"], None),
        ];
        let groups = vec![group("g1", vec![0]), group("g2", vec![1])];
        let edges = infer_dependencies(&groups, &rules, &DependencyConfig::default());
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].kind, DependencyKind::SharedTable);
        assert_eq!(edges[0].strength, 1.0);
        assert_eq!(edges[1].kind, DependencyKind::SharedColumn);
        assert!((edges[1].strength - 0.5).abs() < 1e-12);
        assert!(edges.iter().all(|e| e.source_group_id == "g1"));
    }

    #[test]
    fn weak_edges_dropped_and_no_self_edges() {
        let rules = vec![
            rule(1, &["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"], &[], None),
            rule(2, &["a"], &[], None),
        ];
        let groups = vec![group("g1", vec![0]), group("g2", vec![1]), group("g3", vec![0, 1])];
        let config = DependencyConfig {
            min_strength: Some(0.5),
            ..Default::default()
        };
        let edges = infer_dependencies(&groups, &rules, &config);
        assert!(edges.iter().all(|e| e.source_group_id != e.target_group_id));
        assert!(edges.iter().all(|e| e.strength >= 0.5));
        assert!(!edges.iter().any(|e| e.source_group_id == "g1" && e.target_group_id == "g2"));
    }

    #[test]
    fn before_to_after_is_temporal() {
        let rules = vec![
            rule(1, &["payments"], &[], Some(TriggerTiming::After)),
            rule(2, &["payments"], &[], Some(TriggerTiming::Before)),
        ];
        let groups = vec![group("g1", vec![0]), group("g2", vec![1])];
        let edges = infer_dependencies(&groups, &rules, &DependencyConfig::default());
        let temporal: Vec<_> = edges.iter().filter(|e| e.kind == DependencyKind::Temporal).collect();
        assert_eq!(temporal.len(), 1);
        assert_eq!(temporal[0].source_group_id, "g2");
        assert_eq!(temporal[0].target_group_id, "g1");
    }
}
