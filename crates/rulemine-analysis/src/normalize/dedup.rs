//! Removal of re-extracted rules.

use rulemine_core::model::{Rule, RuleType};
use rulemine_core::types::collections::FxHashMap;

/// Drop rules that repeat an earlier rule's (normalized_expression,
/// rule_type) in the same file on an overlapping line range. `rules` is
/// treated as one extraction pass, so distinct statements on adjacent
/// lines both survive. The first occurrence wins.
pub fn deduplicate_rules(rules: Vec<Rule>) -> Vec<Rule> {
    deduplicate_passes(vec![rules])
}

/// Deduplicate the output of several extraction passes over the same
/// tree. Within a pass only overlapping ranges collapse; across passes an
/// adjacent range is also a re-extraction of the same branch.
pub fn deduplicate_passes(passes: Vec<Vec<Rule>>) -> Vec<Rule> {
    let before: usize = passes.iter().map(Vec::len).sum();
    let mut seen: FxHashMap<(String, RuleType, String), Vec<(usize, usize)>> = FxHashMap::default();
    let mut kept: Vec<Rule> = Vec::with_capacity(before);

    for (pass, rules) in passes.into_iter().enumerate() {
        for rule in rules {
            let key = (
                rule.normalized_expression.clone(),
                rule.rule_type(),
                rule.source.file_path().to_string(),
            );
            let slots = seen.entry(key).or_default();
            let duplicate = slots.iter().any(|&(i, earlier)| {
                let other = &kept[i].source;
                if earlier == pass {
                    other.overlaps(&rule.source)
                } else {
                    other.overlaps_or_adjacent(&rule.source)
                }
            });
            if duplicate {
                tracing::trace!(id = %rule.id, file = rule.source.file_path(), "duplicate rule dropped");
                continue;
            }
            slots.push((kept.len(), pass));
            kept.push(rule);
        }
    }

    if kept.len() < before {
        tracing::debug!(removed = before - kept.len(), "deduplicated rules");
    }
    kept
}
