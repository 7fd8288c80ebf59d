//! Application-code extraction: embedded SQL string literals are fed back
//! through the SQL extractor, and native conditionals that look like
//! business logic become rules of their own.

pub mod business;
pub mod conditionals;
pub mod literals;

use once_cell::sync::Lazy;
use regex::Regex;
use rulemine_core::model::{Construct, Rule, RuleKind};
use rulemine_core::types::collections::BTreeSet;

use self::business::{condition_variables, is_business_condition};
use self::conditionals::{brace_conditionals, python_conditionals, NativeConditional};
use self::literals::{scan_literals, LiteralScan, StringLiteral};
use super::confidence::{score, Adjustments};
use super::context::{ExtractionContext, FileExtraction};
use super::describe::describe;
use super::sql::extract_sql;
use crate::normalize::canonicalize;
use crate::scanner::Language;

static SQL_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\s*(select|insert|update|delete|with|create|alter|merge)\b").unwrap()
});

static SQL_RULE_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(where|having|case|check)\b").unwrap());

/// Whether a string literal holds SQL worth extracting rules from.
pub fn looks_like_rule_sql(text: &str) -> bool {
    SQL_START.is_match(text) && SQL_RULE_CLAUSE.is_match(text)
}

/// Extract rules from one application-code file.
pub fn extract_app(
    source: &str,
    language: Language,
    ext: Option<&str>,
    ctx: &ExtractionContext<'_>,
) -> FileExtraction {
    let mut out = FileExtraction::default();
    let scan = match scan_literals(source, language, ext, ctx.file_path) {
        Ok(scan) => scan,
        Err(e) => {
            tracing::warn!(file = ctx.file_path, error = %e, "tree-sitter failed, literals skipped");
            out.errors.push(e);
            LiteralScan::default()
        }
    };

    let embedded: Vec<&StringLiteral> = scan
        .literals
        .iter()
        .filter(|lit| looks_like_rule_sql(&lit.content))
        .collect();
    for lit in &embedded {
        let sub = ctx.embedded(lit.host_line, language);
        out.merge(extract_sql(&lit.content, &sub));
    }

    let native = match language {
        Language::Python => python_conditionals(source, &scan),
        Language::Java | Language::JavaScript | Language::TypeScript => {
            brace_conditionals(source, &scan)
        }
        Language::Sql => Vec::new(),
    };
    let kept = native
        .into_iter()
        .filter(|c| is_business_condition(&c.condition))
        .map(|c| native_rule(&c, ctx));
    out.rules.extend(kept);

    out.rules
        .sort_by_key(|r| (r.source.start_line(), r.source.end_line()));
    tracing::debug!(
        file = ctx.file_path,
        language = %language,
        literals = scan.literals.len(),
        embedded_sql = embedded.len(),
        rules = out.rules.len(),
        "application extraction finished"
    );
    out
}

fn native_rule(cond: &NativeConditional, ctx: &ExtractionContext<'_>) -> Rule {
    let normalized = canonicalize(&cond.condition);
    let kind = RuleKind::Conditional {
        construct: Construct::AppConditional,
        condition: Some(normalized.clone()),
        action: cond.action.clone(),
    };
    let location = ctx.location(cond.start_line, cond.end_line);
    let confidence = score(Construct::AppConditional, Adjustments::default());
    let mut rule = Rule::new(kind, cond.condition.clone(), normalized, location, confidence);
    rule.description = describe(&rule.kind, &BTreeSet::new());
    rule.variables = condition_variables(&cond.condition);
    rule.set_metadata("construct", Construct::AppConditional.as_str());
    rule
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::RuleType;

    #[test]
    fn recognizes_rule_bearing_sql() {
        assert!(looks_like_rule_sql("\n  SELECT * FROM t WHERE a = 1"));
        assert!(!looks_like_rule_sql("SELECT * FROM t"));
        assert!(!looks_like_rule_sql("where is my mind"));
    }

    #[test]
    fn python_embedded_sql_lines_map_to_host() {
        let src = "import db\n\nQUERY = \"\"\"\nSELECT * FROM orders\nWHERE total > 100\n\"\"\"\n";
        let ctx = ExtractionContext::new("app/q.py", src, 500);
        let out = extract_app(src, Language::Python, Some("py"), &ctx);
        assert!(out.errors.is_empty());
        assert_eq!(out.rules.len(), 1);
        let rule = &out.rules[0];
        assert_eq!(rule.rule_type(), RuleType::Validation);
        assert_eq!(rule.source.start_line(), 5);
        assert_eq!(rule.source.snippet(), "WHERE total > 100");
        assert_eq!(rule.metadata_str("embedded_in"), Some("python"));
        assert!((rule.confidence - 0.85 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn javascript_native_conditionals_are_filtered() {
        let src = "function f(order) {\n  if (order.total > 100) {\n    return 0.1;\n  }\n  if (debug) {\n    log();\n  }\n}\n";
        let ctx = ExtractionContext::new("src/f.js", src, 500);
        let out = extract_app(src, Language::JavaScript, Some("js"), &ctx);
        assert_eq!(out.rules.len(), 1);
        let rule = &out.rules[0];
        assert_eq!(rule.normalized_expression, "order.total > 100");
        assert_eq!(rule.kind.action(), Some("0.1"));
        assert!(rule.variables.contains("order.total"));
        assert!((rule.confidence - 0.70).abs() < 1e-9);
    }
}
