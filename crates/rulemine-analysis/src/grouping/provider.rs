//! The grouping-provider capability.

use rulemine_core::errors::GroupingError;
use rulemine_core::model::Rule;

/// Assigns each rule a group label.
///
/// Labels are dense (`0..k`) and numbered by first appearance in rule
/// order, so equal inputs always give equal labelings.
pub trait GroupingProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the method reads `Rule::embedding`.
    fn needs_features(&self) -> bool;

    fn assign(&self, rules: &[Rule]) -> Result<Vec<usize>, GroupingError>;
}

/// Renumber arbitrary labels densely by first appearance.
pub fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut mapping: Vec<(usize, usize)> = Vec::new();
    labels
        .iter()
        .map(|&l| match mapping.iter().find(|(old, _)| *old == l) {
            Some(&(_, new)) => new,
            None => {
                let new = mapping.len();
                mapping.push((l, new));
                new
            }
        })
        .collect()
}
