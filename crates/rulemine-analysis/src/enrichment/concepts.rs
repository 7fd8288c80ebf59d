//! Business domain concepts tagged onto rules.

use rulemine_core::model::Rule;

/// Concept name and the terms that indicate it.
pub const DOMAIN_CONCEPTS: &[(&str, &[&str])] = &[
    ("pricing", &["price", "cost", "discount", "rate", "fee", "tax", "margin", "markup"]),
    ("eligibility", &["eligible", "qualify", "allowed", "permit", "age", "limit", "tier"]),
    ("customer", &["customer", "client", "user", "account", "member", "subscriber"]),
    ("order", &["order", "purchase", "cart", "checkout", "line_item", "quantity", "qty"]),
    ("inventory", &["inventory", "stock", "warehouse", "sku", "product", "supply"]),
    ("payment", &["payment", "invoice", "balance", "credit", "refund", "amount", "paid"]),
    ("date", &["date", "time", "day", "month", "year", "expir", "deadline", "created_at"]),
    ("validation", &["valid", "check", "required", "must", "null", "approved", "status"]),
];

/// Concepts whose terms appear in the rule's expression, tables, columns
/// or variables, in table order.
pub fn domain_concepts(rule: &Rule) -> Vec<&'static str> {
    let mut haystack = rule.normalized_expression.to_lowercase();
    for name in rule.tables.iter().chain(&rule.columns).chain(&rule.variables) {
        haystack.push(' ');
        haystack.push_str(&name.to_lowercase());
    }
    DOMAIN_CONCEPTS
        .iter()
        .filter(|(_, terms)| terms.iter().any(|t| haystack.contains(t)))
        .map(|(concept, _)| *concept)
        .collect()
}

/// Store each rule's concepts under metadata `domain_concepts`.
pub fn tag_domain_concepts(rules: &mut [Rule]) {
    for rule in rules {
        let concepts = domain_concepts(rule);
        rule.set_metadata("domain_concepts", concepts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, RuleKind, SourceLocation};

    #[test]
    fn tags_from_expression_and_tables() {
        let kind = RuleKind::Validation {
            construct: Construct::Where,
            predicate: "discount > 0".to_string(),
        };
        let loc = SourceLocation::new("q.sql", 1, 1, String::new());
        let mut rule = Rule::new(kind, "discount > 0".into(), "discount > 0".into(), loc, 0.85);
        rule.tables.insert("orders".to_string());
        let mut rules = vec![rule];
        tag_domain_concepts(&mut rules);
        assert_eq!(rules[0].domain_concepts(), vec!["pricing", "order"]);
    }
}
