//! Rule groups and the dependencies between them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::rule::{Rule, TriggerTiming};

/// A cluster of rules sharing semantic or structural similarity.
///
/// `rules` holds indices into the owning model's rule list, in ascending
/// order; groups never copy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub rules: Vec<usize>,
    /// Mean cosine similarity of members to the centroid; 1.0 for groups
    /// built without features.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub centroid: Option<Vec<f32>>,
}

impl RuleGroup {
    /// Resolve member indices against the global rule list.
    /// Out-of-range indices are skipped.
    pub fn members<'a>(&'a self, rules: &'a [Rule]) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter_map(move |&i| rules.get(i))
    }

    pub fn tables(&self, rules: &[Rule]) -> BTreeSet<String> {
        self.members(rules)
            .flat_map(|r| r.tables.iter().cloned())
            .collect()
    }

    pub fn columns(&self, rules: &[Rule]) -> BTreeSet<String> {
        self.members(rules)
            .flat_map(|r| r.columns.iter().cloned())
            .collect()
    }

    pub fn variables(&self, rules: &[Rule]) -> BTreeSet<String> {
        self.members(rules)
            .flat_map(|r| r.variables.iter().cloned())
            .collect()
    }

    pub fn files(&self, rules: &[Rule]) -> BTreeSet<String> {
        self.members(rules)
            .map(|r| r.source.file_path().to_string())
            .collect()
    }

    /// Tables touched by member trigger rules with the given timing.
    pub fn trigger_tables(&self, rules: &[Rule], timing: TriggerTiming) -> BTreeSet<String> {
        self.members(rules)
            .filter(|r| r.kind.trigger_timing() == Some(timing))
            .flat_map(|r| r.tables.iter().cloned())
            .collect()
    }
}

/// Why two groups are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    SharedTable,
    SharedColumn,
    Temporal,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::SharedTable => "shared_table",
            DependencyKind::SharedColumn => "shared_column",
            DependencyKind::Temporal => "temporal",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed edge between two groups. The graph may contain cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDependency {
    pub source_group_id: String,
    pub target_group_id: String,
    pub kind: DependencyKind,
    pub strength: f64,
}
