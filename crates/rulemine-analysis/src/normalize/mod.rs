//! Normalization: canonical expressions, deduplication, confidence
//! filtering.

mod canonical;
mod dedup;

pub use canonical::canonicalize;
pub use dedup::{deduplicate_passes, deduplicate_rules};

use rulemine_core::model::{Rule, RuleKind};

/// Canonicalize every rule's expressions and refresh its id. Idempotent;
/// extraction already produces canonical text, so ids normally hold.
pub fn normalize_rules(rules: Vec<Rule>) -> Vec<Rule> {
    rules
        .into_iter()
        .map(|mut rule| {
            rule.normalized_expression = canonicalize(&rule.normalized_expression);
            normalize_kind(&mut rule.kind);
            rule.refresh_id();
            rule
        })
        .collect()
}

fn normalize_kind(kind: &mut RuleKind) {
    match kind {
        RuleKind::Conditional {
            condition, action, ..
        } => {
            if let Some(c) = condition {
                *c = canonicalize(c);
            }
            if let Some(a) = action {
                *a = a.trim().trim_end_matches(';').trim_end().to_string();
            }
        }
        RuleKind::Validation { predicate, .. } | RuleKind::Constraint { predicate, .. } => {
            *predicate = canonicalize(predicate);
        }
        RuleKind::Calculation { target, expression } => {
            *target = target.trim().to_lowercase();
            *expression = canonicalize(expression);
        }
        RuleKind::Trigger { inner, .. } => normalize_kind(inner),
    }
}

/// Keep rules with `confidence >= min`; returns them with the number
/// dropped.
pub fn filter_by_confidence(rules: Vec<Rule>, min: f64) -> (Vec<Rule>, usize) {
    let before = rules.len();
    let kept: Vec<Rule> = rules.into_iter().filter(|r| r.confidence >= min).collect();
    let removed = before - kept.len();
    if removed > 0 {
        tracing::info!(removed, min_confidence = min, "rules below confidence threshold dropped");
    }
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, SourceLocation};

    fn raw_rule(expr: &str, confidence: f64) -> Rule {
        let kind = RuleKind::Conditional {
            construct: Construct::If,
            condition: Some(expr.to_string()),
            action: Some("x := 1;".to_string()),
        };
        let loc = SourceLocation::new("p.sql", 1, 2, String::new());
        Rule::new(kind, expr.to_string(), expr.to_string(), loc, confidence)
    }

    #[test]
    fn canonicalizes_and_refreshes_ids() {
        let rules = normalize_rules(vec![raw_rule("Total  <>  5", 0.9)]);
        assert_eq!(rules[0].normalized_expression, "total != 5");
        assert_eq!(rules[0].kind.predicate(), Some("total != 5"));
        assert_eq!(rules[0].kind.action(), Some("x := 1"));
        let expected = rulemine_core::model::compute_rule_id("total != 5", &rules[0].source);
        assert_eq!(rules[0].id, expected);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let once = normalize_rules(vec![raw_rule("A==1 AND b<>'X'", 0.9)]);
        let twice = normalize_rules(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_reports_removed() {
        let (kept, removed) = filter_by_confidence(vec![raw_rule("a", 0.9), raw_rule("b", 0.4)], 0.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(removed, 1);
    }
}
