//! The aggregate every output rendering is produced from.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::group::{DependencyKind, RuleDependency, RuleGroup};
use super::rule::{Rule, RuleType};
use crate::constants::{GENERATOR_NAME, VERSION};

/// Run facts carried alongside the model so reports need no other input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub generator: String,
    pub version: String,
    pub files_scanned: usize,
    pub rules_filtered: usize,
    pub file_errors: Vec<String>,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            generator: GENERATOR_NAME.to_string(),
            version: VERSION.to_string(),
            files_scanned: 0,
            rules_filtered: 0,
            file_errors: Vec::new(),
        }
    }
}

/// Rules, groups and dependencies: the sole serialization unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionModel {
    pub rules: Vec<Rule>,
    pub groups: Vec<RuleGroup>,
    pub dependencies: Vec<RuleDependency>,
    #[serde(default)]
    pub metadata: ModelMetadata,
}

impl DecisionModel {
    pub fn new(rules: Vec<Rule>, groups: Vec<RuleGroup>, dependencies: Vec<RuleDependency>) -> Self {
        Self {
            rules,
            groups,
            dependencies,
            metadata: ModelMetadata::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.groups.is_empty() && self.dependencies.is_empty()
    }

    pub fn group(&self, id: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_rules<'a>(&'a self, group: &'a RuleGroup) -> impl Iterator<Item = &'a Rule> + 'a {
        group.members(&self.rules)
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Rules not referenced by any group, in rule order.
    pub fn ungrouped_rules(&self) -> Vec<&Rule> {
        let grouped: BTreeSet<usize> = self.groups.iter().flat_map(|g| g.rules.iter().copied()).collect();
        self.rules
            .iter()
            .enumerate()
            .filter(|(i, _)| !grouped.contains(i))
            .map(|(_, r)| r)
            .collect()
    }

    /// Source files referenced by grouped rules, sorted.
    pub fn grouped_files(&self) -> BTreeSet<String> {
        self.groups
            .iter()
            .flat_map(|g| g.files(&self.rules))
            .collect()
    }

    pub fn rules_by_type(&self) -> BTreeMap<RuleType, usize> {
        let mut counts = BTreeMap::new();
        for rule in &self.rules {
            *counts.entry(rule.rule_type()).or_insert(0) += 1;
        }
        counts
    }

    pub fn dependencies_by_kind(&self) -> BTreeMap<DependencyKind, usize> {
        let mut counts = BTreeMap::new();
        for dep in &self.dependencies {
            *counts.entry(dep.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Dependencies whose source is `group_id`.
    pub fn outgoing<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a RuleDependency> + 'a {
        self.dependencies
            .iter()
            .filter(move |d| d.source_group_id == group_id)
    }
}
