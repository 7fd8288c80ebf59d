//! Decision-requirements graph over rule groups.
//!
//! Nodes are group ids in model order; edges carry the dependency kind and
//! strength. Cycles are allowed and reported, never rejected.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use rulemine_core::model::{DecisionModel, DependencyKind};
use rulemine_core::types::collections::{BTreeSet, FxHashMap};

#[derive(Debug, Clone, Copy)]
pub struct DrdEdge {
    pub kind: DependencyKind,
    pub strength: f64,
}

#[derive(Debug, Default)]
pub struct DrdGraph {
    graph: DiGraph<String, DrdEdge>,
    index: FxHashMap<String, NodeIndex>,
}

impl DrdGraph {
    /// Edges naming unknown groups are skipped with a warning.
    pub fn build(model: &DecisionModel) -> Self {
        let mut drd = Self::default();
        for group in &model.groups {
            let node = drd.graph.add_node(group.id.clone());
            drd.index.insert(group.id.clone(), node);
        }
        for dep in &model.dependencies {
            let (Some(&a), Some(&b)) = (
                drd.index.get(&dep.source_group_id),
                drd.index.get(&dep.target_group_id),
            ) else {
                tracing::warn!(
                    source = %dep.source_group_id,
                    target = %dep.target_group_id,
                    "dependency references an unknown group"
                );
                continue;
            };
            drd.graph.add_edge(
                a,
                b,
                DrdEdge {
                    kind: dep.kind,
                    strength: dep.strength,
                },
            );
        }
        drd
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Groups the given group requires: sources of incoming edges of the
    /// given kinds, deduplicated, in model order.
    pub fn required_by(&self, group_id: &str, kinds: &[DependencyKind]) -> Vec<&str> {
        let Some(&node) = self.index.get(group_id) else {
            return Vec::new();
        };
        let sources: BTreeSet<NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|e| kinds.contains(&e.weight().kind))
            .map(|e| e.source())
            .collect();
        sources.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Edges leaving `group_id` of the given kind, as (target, edge).
    pub fn outgoing(&self, group_id: &str, kind: DependencyKind) -> Vec<(&str, DrdEdge)> {
        self.edges(group_id, kind, Direction::Outgoing)
    }

    /// Edges entering `group_id` of the given kind, as (source, edge).
    pub fn incoming(&self, group_id: &str, kind: DependencyKind) -> Vec<(&str, DrdEdge)> {
        self.edges(group_id, kind, Direction::Incoming)
    }

    fn edges(&self, group_id: &str, kind: DependencyKind, dir: Direction) -> Vec<(&str, DrdEdge)> {
        let Some(&node) = self.index.get(group_id) else {
            return Vec::new();
        };
        let mut out: Vec<(NodeIndex, DrdEdge)> = self
            .graph
            .edges_directed(node, dir)
            .filter(|e| e.weight().kind == kind)
            .map(|e| {
                let peer = if dir == Direction::Outgoing { e.target() } else { e.source() };
                (peer, *e.weight())
            })
            .collect();
        out.sort_by_key(|(n, _)| *n);
        out.into_iter().map(|(n, e)| (self.graph[n].as_str(), e)).collect()
    }

    /// Strongly connected components with more than one group, each sorted
    /// by model order.
    pub fn cycles(&self) -> Vec<Vec<&str>> {
        let mut cycles: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .collect();
        for scc in &mut cycles {
            scc.sort();
        }
        cycles.sort();
        cycles
            .into_iter()
            .map(|scc| scc.into_iter().map(|n| self.graph[n].as_str()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{RuleDependency, RuleGroup};

    fn group(id: &str) -> RuleGroup {
        RuleGroup {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            category: "Validation".to_string(),
            rules: Vec::new(),
            confidence: 1.0,
            centroid: None,
        }
    }

    fn dep(a: &str, b: &str, kind: DependencyKind) -> RuleDependency {
        RuleDependency {
            source_group_id: a.to_string(),
            target_group_id: b.to_string(),
            kind,
            strength: 0.5,
        }
    }

    fn model(deps: Vec<RuleDependency>) -> DecisionModel {
        DecisionModel::new(
            Vec::new(),
            vec![group("group_1"), group("group_2"), group("group_3")],
            deps,
        )
    }

    #[test]
    fn requirements_are_deduplicated_across_kinds() {
        let drd = DrdGraph::build(&model(vec![
            dep("group_1", "group_2", DependencyKind::SharedTable),
            dep("group_1", "group_2", DependencyKind::SharedColumn),
            dep("group_3", "group_2", DependencyKind::Temporal),
        ]));
        let shared = [DependencyKind::SharedTable, DependencyKind::SharedColumn];
        assert_eq!(drd.required_by("group_2", &shared), vec!["group_1"]);
        assert!(drd.required_by("group_1", &shared).is_empty());
        assert_eq!(drd.incoming("group_2", DependencyKind::Temporal).len(), 1);
        assert_eq!(drd.edge_count(), 3);
    }

    #[test]
    fn cycles_are_reported() {
        let drd = DrdGraph::build(&model(vec![
            dep("group_1", "group_2", DependencyKind::Temporal),
            dep("group_2", "group_1", DependencyKind::Temporal),
        ]));
        assert_eq!(drd.cycles(), vec![vec!["group_1", "group_2"]]);
    }

    #[test]
    fn unknown_groups_are_skipped() {
        let drd = DrdGraph::build(&model(vec![dep("group_1", "group_9", DependencyKind::SharedTable)]));
        assert_eq!(drd.node_count(), 3);
        assert_eq!(drd.edge_count(), 0);
    }
}
