//! Human-readable Markdown report of a decision model.

use std::fmt::Write;

use rulemine_core::config::DmnConfig;
use rulemine_core::model::{DecisionModel, Rule, RuleGroup};

use crate::graph::DrdGraph;

/// Rules listed per group before the rest are summarized.
pub const MAX_RULES_PER_GROUP: usize = 10;

pub struct MarkdownReport {
    pub title: String,
}

impl MarkdownReport {
    pub fn new(config: &DmnConfig) -> Self {
        Self {
            title: config.effective_definitions_name().to_string(),
        }
    }

    pub fn render(&self, model: &DecisionModel) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# {}\n", escape_header(&self.title));
        let _ = writeln!(
            md,
            "*Generated by {} {}*\n",
            model.metadata.generator, model.metadata.version
        );

        md.push_str("## Summary\n\n| Metric | Count |\n|---|---|\n");
        let _ = writeln!(md, "| Files scanned | {} |", model.metadata.files_scanned);
        let _ = writeln!(md, "| Rules | {} |", model.rules.len());
        let _ = writeln!(md, "| Groups | {} |", model.groups.len());
        let _ = writeln!(md, "| Dependencies | {} |", model.dependencies.len());
        let _ = writeln!(md, "| Rules below confidence threshold | {} |", model.metadata.rules_filtered);
        let _ = writeln!(md, "| File errors | {} |\n", model.metadata.file_errors.len());

        md.push_str("## Rules by Type\n\n| Type | Count |\n|---|---|\n");
        for (rule_type, count) in model.rules_by_type() {
            let _ = writeln!(md, "| {} | {} |", rule_type.as_str(), count);
        }
        md.push('\n');

        md.push_str("## Groups\n\n");
        if model.groups.is_empty() {
            md.push_str("No groups.\n\n");
        }
        for group in &model.groups {
            self.render_group(&mut md, model, group);
        }

        self.render_dependencies(&mut md, model);

        let ungrouped = model.ungrouped_rules();
        if !ungrouped.is_empty() {
            md.push_str("## Ungrouped Rules\n\n");
            for rule in ungrouped {
                rule_line(&mut md, rule);
            }
            md.push('\n');
        }

        if !model.metadata.file_errors.is_empty() {
            md.push_str("## File Errors\n\n");
            for err in &model.metadata.file_errors {
                let _ = writeln!(md, "- {}", inline(err));
            }
            md.push('\n');
        }
        md
    }

    fn render_group(&self, md: &mut String, model: &DecisionModel, group: &RuleGroup) {
        let _ = writeln!(md, "### {} (`{}`)\n", escape_header(&group.name), group.id);
        let _ = writeln!(md, "- **Category:** {}", inline(&group.category));
        let _ = writeln!(md, "- **Confidence:** {:.2}", group.confidence);
        let _ = writeln!(md, "- **Description:** {}\n", inline(&group.description));

        let members: Vec<&Rule> = model.group_rules(group).collect();
        for rule in members.iter().take(MAX_RULES_PER_GROUP) {
            rule_line(md, rule);
        }
        if members.len() > MAX_RULES_PER_GROUP {
            let _ = writeln!(md, "- ... and {} more", members.len() - MAX_RULES_PER_GROUP);
        }
        md.push('\n');
    }

    fn render_dependencies(&self, md: &mut String, model: &DecisionModel) {
        md.push_str("## Dependencies\n\n");
        if model.dependencies.is_empty() {
            md.push_str("No dependencies.\n\n");
            return;
        }
        md.push_str("| From | To | Kind | Strength |\n|---|---|---|---|\n");
        for dep in &model.dependencies {
            let _ = writeln!(
                md,
                "| {} | {} | {} | {:.2} |",
                group_label(model, &dep.source_group_id),
                group_label(model, &dep.target_group_id),
                dep.kind,
                dep.strength
            );
        }
        md.push('\n');

        let drd = DrdGraph::build(model);
        for cycle in drd.cycles() {
            let _ = writeln!(md, "Cycle: {}\n", cycle.join(" → "));
        }
    }
}

fn rule_line(md: &mut String, rule: &Rule) {
    let anchor = format!(
        "{}#L{}-L{}",
        rule.source.file_path(),
        rule.source.start_line(),
        rule.source.end_line()
    );
    let _ = writeln!(
        md,
        "- `{}` **{}** {} ([{}]({})) ({:.2})",
        rule.id,
        rule.rule_type().as_str(),
        inline(&rule.description),
        anchor,
        anchor.replace(' ', "%20"),
        rule.confidence
    );
}

fn group_label(model: &DecisionModel, group_id: &str) -> String {
    match model.group(group_id) {
        Some(group) => inline(&group.name).replace('|', "\\|"),
        None => group_id.to_string(),
    }
}

/// Escape markdown injection in headers.
fn escape_header(s: &str) -> String {
    s.replace('#', "\\#").replace('\n', " ").replace('\r', "")
}

fn inline(s: &str) -> String {
    s.replace('\n', " ").replace('\r', "")
}
