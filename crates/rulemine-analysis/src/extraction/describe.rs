//! Human-readable rule descriptions.

use rulemine_core::model::{Construct, RuleKind, TriggerTiming};
use rulemine_core::types::collections::BTreeSet;

pub fn describe(kind: &RuleKind, tables: &BTreeSet<String>) -> String {
    let on_tables = if tables.is_empty() {
        String::new()
    } else {
        format!(" on {}", tables.iter().cloned().collect::<Vec<_>>().join(", "))
    };
    match kind {
        RuleKind::Conditional {
            construct,
            condition,
            action,
        } => {
            let head = match (construct, condition) {
                (Construct::CaseElse, _) => "CASE fallthrough branch".to_string(),
                (Construct::Else, _) => "ELSE branch".to_string(),
                (Construct::CaseWhen, Some(c)) => format!("CASE branch when {c}"),
                (Construct::AppConditional, Some(c)) => format!("Application conditional: {c}"),
                (other, Some(c)) => format!("{} branch: {c}", other.as_str().to_uppercase()),
                (other, None) => format!("{} branch", other.as_str().to_uppercase()),
            };
            match action {
                Some(a) => format!("{head} then {a}"),
                None => head,
            }
        }
        RuleKind::Validation {
            construct,
            predicate,
        } => {
            let clause = if *construct == Construct::Having {
                "HAVING"
            } else {
                "WHERE"
            };
            format!("{clause} filter{on_tables}: {predicate}")
        }
        RuleKind::Constraint {
            predicate,
            constraint_name,
        } => match constraint_name {
            Some(name) => format!("CHECK constraint {name}{on_tables}: {predicate}"),
            None => format!("CHECK constraint{on_tables}: {predicate}"),
        },
        RuleKind::Calculation { target, expression } => {
            format!("Calculated column {target} = {expression}")
        }
        RuleKind::Trigger {
            trigger_name,
            timing,
            table,
            inner,
        } => {
            let when = match timing {
                Some(TriggerTiming::Before) => "BEFORE ",
                Some(TriggerTiming::After) => "AFTER ",
                Some(TriggerTiming::InsteadOf) => "INSTEAD OF ",
                None => "",
            };
            let target = table
                .as_ref()
                .map(|t| format!(" on {t}"))
                .unwrap_or_default();
            format!(
                "{when}trigger {trigger_name}{target}: {}",
                describe(inner, &BTreeSet::new())
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_mentions_table() {
        let kind = RuleKind::Constraint {
            predicate: "price > 0".into(),
            constraint_name: None,
        };
        let tables: BTreeSet<String> = ["products".to_string()].into_iter().collect();
        assert_eq!(describe(&kind, &tables), "CHECK constraint on products: price > 0");
    }

    #[test]
    fn trigger_wraps_inner_description() {
        let kind = RuleKind::Trigger {
            trigger_name: "trg_qty".into(),
            timing: Some(TriggerTiming::Before),
            table: Some("orders".into()),
            inner: Box::new(RuleKind::Conditional {
                construct: Construct::If,
                condition: Some("new.qty < 0".into()),
                action: Some("NEW.qty := 0".into()),
            }),
        };
        assert_eq!(
            describe(&kind, &BTreeSet::new()),
            "BEFORE trigger trg_qty on orders: IF branch: new.qty < 0 then NEW.qty := 0"
        );
    }
}
