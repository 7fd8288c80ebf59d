//! Extraction scenarios over realistic SQL and application files.

use proptest::prelude::*;
use rulemine_analysis::extraction::sql::extract_sql;
use rulemine_analysis::extraction::ExtractionContext;
use rulemine_analysis::normalize::{deduplicate_passes, deduplicate_rules};
use rulemine_core::errors::ParseError;
use rulemine_core::model::{RuleKind, RuleType};

const PROC_SQL: &str = "CREATE FUNCTION discount(total NUMERIC) RETURNS NUMERIC AS $$
BEGIN
IF total > 1000 THEN
  RETURN total * 0.1;
ELSIF total > 500 THEN
  RETURN total * 0.05;
ELSE
  RETURN 0;
END IF;
END;
$$ LANGUAGE plpgsql;
";

fn extract(path: &str, sql: &str) -> rulemine_analysis::extraction::FileExtraction {
    let ctx = ExtractionContext::new(path, sql, 500);
    extract_sql(sql, &ctx)
}

/// IF/ELSIF/ELSE over lines 3-9 gives three conditional rules with
/// disjoint ranges inside [3, 9].
#[test]
fn test_procedural_if_scenario() {
    let out = extract("proc.sql", PROC_SQL);
    assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);
    assert_eq!(out.rules.len(), 3, "one rule per branch");

    let mut previous_end = 2;
    for rule in &out.rules {
        assert_eq!(rule.rule_type(), RuleType::Conditional);
        assert!(rule.confidence >= 0.8, "confidence {} below 0.8", rule.confidence);
        let (start, end) = (rule.source.start_line(), rule.source.end_line());
        assert!(start > previous_end, "ranges overlap at line {start}");
        assert!((3..=9).contains(&start) && (3..=9).contains(&end), "range {start}-{end} outside 3-9");
        previous_end = end;
    }
    let actions: Vec<_> = out.rules.iter().map(|r| r.kind.action()).collect();
    assert_eq!(actions, vec![Some("total * 0.1"), Some("total * 0.05"), Some("0")]);
}

/// A column-level CHECK on `products` yields one constraint rule naming
/// the table and column.
#[test]
fn test_check_scenario() {
    let sql = "CREATE TABLE products (\n  id SERIAL PRIMARY KEY,\n  price NUMERIC CHECK (price > 0)\n);\n";
    let out = extract("schema.sql", sql);
    assert_eq!(out.rules.len(), 1, "one CHECK, one rule");
    let rule = &out.rules[0];
    assert_eq!(rule.rule_type(), RuleType::Constraint);
    assert_eq!(rule.tables.iter().collect::<Vec<_>>(), vec!["products"]);
    assert_eq!(rule.columns.iter().collect::<Vec<_>>(), vec!["price"]);
    assert_eq!(rule.source.start_line(), 3);
}

/// Table-level CHECKs are recognized too, with their constraint names.
#[test]
fn test_table_level_check() {
    let sql = "CREATE TABLE loans (\n  amount NUMERIC,\n  rate NUMERIC,\n  CONSTRAINT sane_rate CHECK (rate BETWEEN 0 AND 1 AND amount > 0)\n);";
    let out = extract("loans.sql", sql);
    assert_eq!(out.rules.len(), 1);
    assert!(matches!(
        &out.rules[0].kind,
        RuleKind::Constraint { constraint_name: Some(n), .. } if n == "sane_rate"
    ));
    assert!(out.rules[0].columns.contains("rate"), "columns: {:?}", out.rules[0].columns);
}

/// The same predicate in two statements survives twice; extracting the
/// same file twice and deduplicating keeps one copy of each.
#[test]
fn test_repeated_where_scenario() {
    let sql = "SELECT * FROM orders WHERE status = 'open';\n\n\nSELECT id FROM orders WHERE status = 'open';\n";
    let first = extract("q.sql", sql);
    assert_eq!(first.rules.len(), 2, "distinct statements stay distinct");
    assert_ne!(first.rules[0].id, first.rules[1].id);

    let mut twice = first.rules.clone();
    twice.extend(extract("q.sql", sql).rules);
    let deduped = deduplicate_rules(twice);
    assert_eq!(deduped.len(), 2, "re-extracted copies collapse");
}

/// Back-to-back statements with the same predicate sit on adjacent lines
/// and still survive as two rules.
#[test]
fn test_repeated_where_on_adjacent_lines() {
    let sql = "SELECT * FROM orders WHERE status = 'open';\nSELECT id FROM invoices WHERE status = 'open';\n";
    let out = extract("q.sql", sql);
    assert_eq!(out.rules.len(), 2);
    let deduped = deduplicate_rules(out.rules.clone());
    assert_eq!(deduped.len(), 2, "distinct statements on lines 1 and 2 are both kept");

    let passes = deduplicate_passes(vec![out.rules.clone(), extract("q.sql", sql).rules]);
    assert_eq!(passes.len(), 2, "a second pass over the file adds nothing");
}

/// Nested boolean groups stay whole; only top-level ANDs split.
#[test]
fn test_nested_groups_do_not_split() {
    let sql = "SELECT * FROM accounts a\nWHERE (a.balance > 0 AND a.active) AND a.region = 'EU'\nGROUP BY a.id\nHAVING COUNT(*) > 1;";
    let out = extract("a.sql", sql);
    let exprs: Vec<_> = out.rules.iter().map(|r| r.normalized_expression.as_str()).collect();
    assert!(exprs.contains(&"(a.balance > 0 and a.active)"), "exprs: {exprs:?}");
    assert!(exprs.contains(&"count(*) > 1"), "exprs: {exprs:?}");
    assert!(!exprs.contains(&"a.balance > 0"), "parenthesized group must not split");
    assert!(out.rules.iter().all(|r| r.tables.contains("accounts")));
}

/// An unmatched END stops the file but keeps rules closed before it.
#[test]
fn test_unmatched_terminator_is_recoverable() {
    let sql = "SELECT * FROM t WHERE a > 1;\nEND LOOP;\nSELECT * FROM t WHERE b > 2;";
    let out = extract("broken.sql", sql);
    assert_eq!(out.rules.len(), 1, "rules before the mismatch are kept");
    match out.errors.as_slice() {
        [ParseError::UnmatchedTerminator { line, terminator, .. }] => {
            assert_eq!(*line, 2);
            assert_eq!(terminator, "END LOOP");
        }
        other => panic!("expected one UnmatchedTerminator, got {other:?}"),
    }
}

/// A package body closes with `END name;` like any named block.
#[test]
fn test_package_body_closes_cleanly() {
    let sql = "CREATE OR REPLACE PACKAGE BODY billing AS
  PROCEDURE apply_discount(p_total NUMBER) IS
  BEGIN
    IF p_total > 1000 THEN
      g_rate := 0.1;
    END IF;
  END apply_discount;
END billing;
/
SELECT * FROM invoices WHERE status = 'open';
";
    let out = extract("billing.pkb", sql);
    assert!(out.errors.is_empty(), "errors: {:?}", out.errors);
    let exprs: Vec<_> = out.rules.iter().map(|r| r.normalized_expression.as_str()).collect();
    assert!(exprs.contains(&"p_total > 1000"), "exprs: {exprs:?}");
    assert!(exprs.contains(&"status = 'open'"), "exprs: {exprs:?}");
    let branch = out
        .rules
        .iter()
        .find(|r| r.normalized_expression == "p_total > 1000")
        .unwrap();
    assert_eq!(branch.rule_type(), RuleType::Conditional);
    assert_eq!(branch.source.start_line(), 4);
}

/// A CASE inside a routine assignment is procedural: names are variables,
/// not columns.
#[test]
fn test_case_in_assignment() {
    let sql = "CREATE FUNCTION tier(spend NUMERIC) RETURNS TEXT AS $$\nDECLARE t TEXT;\nBEGIN\n  t := CASE WHEN spend >= 5000 THEN 'gold' ELSE 'std' END;\n  RETURN t;\nEND;\n$$ LANGUAGE plpgsql;";
    let out = extract("tier.sql", sql);
    assert_eq!(out.rules.len(), 2);
    assert!(out.rules[0].columns.is_empty(), "procedural names are not columns");
    assert!(out.rules[0].variables.contains("spend"));
    assert_eq!(out.rules[1].normalized_expression, "else not (spend >= 5000)");
    assert_eq!(out.rules[0].metadata_str("routine"), Some("tier"));
}

/// Identical content always yields identical ids in identical order.
#[test]
fn test_extraction_is_deterministic() {
    let a: Vec<_> = extract("proc.sql", PROC_SQL).rules.into_iter().map(|r| r.id).collect();
    let b: Vec<_> = extract("proc.sql", PROC_SQL).rules.into_iter().map(|r| r.id).collect();
    assert_eq!(a, b);
    assert!(a.iter().all(|id| id.len() == 21 && id.starts_with("rule_")), "ids: {a:?}");
}

fn sql_fragment() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "SELECT", "FROM", "t", "WHERE", "a", ">", "1", "AND", "OR", "(", ")", ";", "\n", "CASE",
        "WHEN", "THEN", "ELSE", "END", "IF", "ELSIF", "BEGIN", "CHECK", "'x'", ":p", "$$", "BETWEEN",
        "HAVING", "CREATE", "TRIGGER", "BEFORE", "ON", "LOOP",
    ]);
    prop::collection::vec(words, 0..60).prop_map(|w| w.join(" "))
}

proptest! {
    /// Arbitrary keyword soup never panics, and every rule stays within
    /// confidence bounds and inside the input's lines.
    #[test]
    fn prop_confidence_and_ranges_bounded(sql in sql_fragment()) {
        let out = extract("fuzz.sql", &sql);
        let lines = sql.split('\n').count() as u32;
        for rule in &out.rules {
            prop_assert!((0.0..=1.0).contains(&rule.confidence));
            prop_assert!(rule.source.start_line() >= 1);
            prop_assert!(rule.source.start_line() <= rule.source.end_line());
            prop_assert!(rule.source.end_line() <= lines.max(1));
        }
    }
}
