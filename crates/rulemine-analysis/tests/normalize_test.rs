//! Normalization over extracted rules: idempotence and confidence filtering.

use proptest::prelude::*;
use rulemine_analysis::extraction::sql::extract_sql;
use rulemine_analysis::extraction::ExtractionContext;
use rulemine_analysis::normalize::{deduplicate_rules, filter_by_confidence, normalize_rules};
use rulemine_core::model::Rule;

fn rules_from(sql: &str) -> Vec<Rule> {
    let ctx = ExtractionContext::new("n.sql", sql, 500);
    extract_sql(sql, &ctx).rules
}

fn snapshot(rules: &[Rule]) -> Vec<(String, String, Option<String>)> {
    rules
        .iter()
        .map(|r| {
            (
                r.id.clone(),
                r.normalized_expression.clone(),
                r.kind.predicate().map(str::to_string),
            )
        })
        .collect()
}

/// Normalizing twice gives the same ids, expressions and predicates as once.
#[test]
fn test_normalize_is_idempotent_on_real_rules() {
    let sql = "SELECT * FROM Orders WHERE Total  >=  100 AND Status <> 'X';\n\
               CREATE TABLE p (price NUMERIC CHECK ( price>0 ));";
    let once = normalize_rules(rules_from(sql));
    let twice = normalize_rules(once.clone());
    assert_eq!(snapshot(&once), snapshot(&twice), "normalization must be idempotent");
    assert_eq!(once[0].normalized_expression, "total >= 100");
    assert_eq!(once[1].normalized_expression, "status != 'X'");
}

/// Rules below the threshold are dropped and counted.
#[test]
fn test_filter_by_confidence_counts_drops() {
    let rules = rules_from(
        "SELECT * FROM c WHERE region = :region;\nSELECT * FROM c WHERE tier = 'gold';",
    );
    assert_eq!(rules.len(), 2);
    let (kept, dropped) = filter_by_confidence(rules.clone(), 0.8);
    assert_eq!(dropped, 1, "the bind-parameter rule falls below 0.8");
    assert_eq!(kept.len(), 1);

    let (kept, dropped) = filter_by_confidence(rules, 0.65);
    assert_eq!((kept.len(), dropped), (2, 0), "both rules clear a lower threshold");
}

/// Deduplication never changes the relative order of surviving rules.
#[test]
fn test_dedup_preserves_order() {
    let sql = "SELECT * FROM t WHERE a > 1;\nSELECT * FROM t WHERE b > 2;\nSELECT * FROM t WHERE c > 3;";
    let mut rules = rules_from(sql);
    let ids: Vec<_> = rules.iter().map(|r| r.id.clone()).collect();
    rules.extend(rules_from(sql));
    let deduped = deduplicate_rules(rules);
    let after: Vec<_> = deduped.iter().map(|r| r.id.clone()).collect();
    assert_eq!(after, ids);
}

proptest! {
    /// Whatever predicate text goes in, the second normalization is a no-op.
    #[test]
    fn prop_normalize_idempotent(
        lhs in "[a-zA-Z_]{1,8}",
        op in prop::sample::select(vec!["=", "==", "<>", "!=", ">=", "<=", ">", "<"]),
        rhs in "[0-9]{1,4}",
        pad in " {0,3}",
    ) {
        let sql = format!("SELECT * FROM t WHERE {lhs}{pad}{op}{pad}{rhs};");
        let once = normalize_rules(rules_from(&sql));
        let twice = normalize_rules(once.clone());
        prop_assert_eq!(snapshot(&once), snapshot(&twice));
    }
}
