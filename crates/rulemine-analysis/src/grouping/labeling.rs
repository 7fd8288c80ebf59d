//! Turning a labeling into named, scored [`RuleGroup`]s.

use rulemine_core::model::{Rule, RuleGroup};
use rulemine_core::types::collections::BTreeMap;

use super::vectors::{cosine, mean};

/// Most frequent key; ties go to the alphabetically first.
fn most_common<'a>(items: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(k, _)| k)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build one group per distinct label. `labels[i]` belongs to `rules[i]`;
/// groups come out in label order with ids `group_1`, `group_2`, ...
pub fn build_groups(rules: &[Rule], labels: &[usize]) -> Vec<RuleGroup> {
    let count = labels.iter().copied().max().map_or(0, |m| m + 1);
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); count];
    for (i, &label) in labels.iter().enumerate().take(rules.len()) {
        members[label].push(i);
    }

    members
        .into_iter()
        .filter(|m| !m.is_empty())
        .enumerate()
        .map(|(n, indices)| make_group(n + 1, rules, indices))
        .collect()
}

fn make_group(n: usize, rules: &[Rule], indices: Vec<usize>) -> RuleGroup {
    let group_rules: Vec<&Rule> = indices.iter().map(|&i| &rules[i]).collect();

    let vectors: Option<Vec<&[f32]>> = group_rules.iter().map(|r| r.embedding.as_deref()).collect();
    let centroid = vectors.as_ref().and_then(|v| mean(v.iter().copied()));
    let confidence = match (&vectors, &centroid) {
        (Some(v), Some(c)) if !v.is_empty() => {
            v.iter().map(|x| cosine(x, c)).sum::<f64>() / v.len() as f64
        }
        _ => 1.0,
    };

    let concept = most_common(group_rules.iter().flat_map(|r| r.domain_concepts()));
    let category = match concept {
        Some(c) => title_case(c),
        None => group_rules
            .first()
            .map_or_else(|| "General".to_string(), |r| r.rule_type().title().to_string()),
    };
    let table = most_common(group_rules.iter().flat_map(|r| r.tables.iter().map(String::as_str)));
    let name = match table {
        Some(t) => format!("{category} - {t}"),
        None => format!("{category} Rules"),
    };

    let types: Vec<&str> = {
        let mut t: Vec<&str> = group_rules.iter().map(|r| r.rule_type().as_str()).collect();
        t.sort_unstable();
        t.dedup();
        t
    };
    let tables: Vec<&str> = {
        let mut t: Vec<&str> = group_rules
            .iter()
            .flat_map(|r| r.tables.iter().map(String::as_str))
            .collect();
        t.sort_unstable();
        t.dedup();
        t
    };
    let description = format!(
        "Group of {} rules. Types: {}. Tables: {}.",
        indices.len(),
        types.join(", "),
        if tables.is_empty() {
            "none".to_string()
        } else {
            tables.join(", ")
        }
    );

    RuleGroup {
        id: format!("group_{n}"),
        name,
        description,
        category,
        rules: indices,
        confidence: confidence.clamp(0.0, 1.0),
        centroid,
    }
}
