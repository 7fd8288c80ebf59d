//! Business-logic heuristics for application-code conditionals.

use once_cell::sync::Lazy;
use regex::Regex;
use rulemine_core::types::collections::BTreeSet;

/// Terms that mark a condition as business logic rather than plumbing.
pub const BUSINESS_KEYWORDS: &[&str] = &[
    "price", "amount", "total", "discount", "rate", "fee", "age", "date", "status", "eligible",
    "valid", "approved", "limit", "threshold", "minimum", "maximum", "balance",
];

static NUMERIC_COMPARISON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[<>]=?|[=!]==?)\s*-?\d|-?\d[\d.]*\s*(?:[<>]=?|[=!]==?)").unwrap()
});

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*").unwrap());

/// Words that never name an input.
const NON_VARIABLES: &[&str] = &[
    "and", "or", "not", "in", "is", "None", "True", "False", "null", "undefined", "true",
    "false", "instanceof", "typeof", "new", "this", "self", "lambda", "if", "else",
];

/// Whether a condition looks like business logic: it mentions a business
/// keyword or compares against a numeric literal.
pub fn is_business_condition(condition: &str) -> bool {
    let lower = condition.to_lowercase();
    BUSINESS_KEYWORDS.iter().any(|k| lower.contains(k)) || NUMERIC_COMPARISON.is_match(condition)
}

/// Dotted identifiers read by a condition, outside string literals.
pub fn condition_variables(condition: &str) -> BTreeSet<String> {
    let code = blank_string_literals(condition);
    IDENTIFIER
        .find_iter(&code)
        .filter(|m| {
            // Skip method calls and the tail of numeric literals like 1e5.
            let next = code[m.end()..].trim_start().chars().next();
            let prev = code[..m.start()].chars().next_back();
            next != Some('(') && !prev.is_some_and(|c| c.is_ascii_digit())
        })
        .map(|m| m.as_str())
        .filter(|name| !NON_VARIABLES.contains(name))
        .map(|name| name.strip_prefix("self.").or_else(|| name.strip_prefix("this.")).unwrap_or(name))
        .map(str::to_string)
        .collect()
}

/// Replace the contents of quoted strings with spaces, keeping offsets.
fn blank_string_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                    out.push(c);
                    continue;
                }
                out.extend(std::iter::repeat(' ').take(c.len_utf8()));
            }
            None => {
                if matches!(c, '\'' | '"' | '`') {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
    out
}
