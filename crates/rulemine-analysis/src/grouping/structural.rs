//! No-feature grouping by first table and file.

use rulemine_core::errors::GroupingError;
use rulemine_core::model::Rule;

use super::provider::{renumber, GroupingProvider};

pub struct StructuralGrouping;

impl GroupingProvider for StructuralGrouping {
    fn name(&self) -> &str {
        "structural"
    }

    fn needs_features(&self) -> bool {
        false
    }

    fn assign(&self, rules: &[Rule]) -> Result<Vec<usize>, GroupingError> {
        let mut keys: Vec<(Option<&str>, &str)> = Vec::new();
        let raw: Vec<usize> = rules
            .iter()
            .map(|r| {
                let key = (r.tables.iter().next().map(String::as_str), r.source.file_path());
                match keys.iter().position(|k| *k == key) {
                    Some(i) => i,
                    None => {
                        keys.push(key);
                        keys.len() - 1
                    }
                }
            })
            .collect();
        Ok(renumber(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, RuleKind, SourceLocation};

    fn rule(file: &str, table: Option<&str>, line: u32) -> Rule {
        let kind = RuleKind::Validation {
            construct: Construct::Where,
            predicate: "x".to_string(),
        };
        let loc = SourceLocation::new(file, line, line, String::new());
        let mut r = Rule::new(kind, String::new(), "x".to_string(), loc, 0.85);
        if let Some(t) = table {
            r.tables.insert(t.to_string());
        }
        r
    }

    #[test]
    fn groups_by_table_and_file() {
        let rules = vec![
            rule("a.sql", Some("orders"), 1),
            rule("a.sql", Some("customers"), 2),
            rule("a.sql", Some("orders"), 3),
            rule("b.sql", Some("orders"), 1),
            rule("b.sql", None, 2),
        ];
        let labels = StructuralGrouping.assign(&rules).unwrap();
        assert_eq!(labels, vec![0, 1, 0, 2, 3]);
    }
}
