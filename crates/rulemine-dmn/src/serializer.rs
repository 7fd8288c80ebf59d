//! DMN 1.3 decision-requirements document writer.
//!
//! One `decision` per rule group with a FIRST-hit decision table (one row per
//! member rule), one `inputData` per distinct variable, and one
//! `knowledgeSource` per contributing file. Provenance lives in
//! `extensionElements` under a separate namespace so DMN tools skip it.

use std::collections::BTreeMap;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rulemine_core::config::DmnConfig;
use rulemine_core::constants::{DMN_NAMESPACE, MANUAL_COMPLETION_PLACEHOLDER, VERSION};
use rulemine_core::errors::SerializationError;
use rulemine_core::model::{cap_chars, DecisionModel, DependencyKind, Rule, RuleGroup, RuleKind};

use crate::graph::DrdGraph;
use crate::ids::IdContext;

/// Prefix bound to the traceability namespace.
pub const TRACE_PREFIX: &str = "trace";

const FORMAT: &str = "dmn";
const SHARED_KINDS: [DependencyKind; 2] = [DependencyKind::SharedTable, DependencyKind::SharedColumn];

#[derive(Debug, Clone)]
pub struct DmnSerializer {
    namespace: String,
    definitions_name: String,
    exporter: String,
    snippet_max_chars: usize,
    include_snippets: bool,
    pretty: bool,
}

impl DmnSerializer {
    pub fn new(config: &DmnConfig) -> Self {
        Self {
            namespace: config.effective_namespace().to_string(),
            definitions_name: config.effective_definitions_name().to_string(),
            exporter: config.effective_exporter().to_string(),
            snippet_max_chars: config.effective_snippet_max_chars(),
            include_snippets: config.effective_include_snippets(),
            pretty: config.effective_pretty_print(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Render the whole model. Ids are allocated from a fresh [`IdContext`]
    /// so the same model always yields the same document.
    pub fn serialize(&self, model: &DecisionModel) -> Result<String, SerializationError> {
        let mut ids = IdContext::new();
        let plan = IdPlan::build(model, &mut ids)?;
        let drd = DrdGraph::build(model);
        let mut xml = Xml::new(self.pretty);

        xml.decl()?;
        let definitions_id = ids.claim(&format!("definitions_{}", self.definitions_name));
        let trace_xmlns = format!("xmlns:{TRACE_PREFIX}");
        xml.start(
            "definitions",
            &[
                ("xmlns", DMN_NAMESPACE),
                (trace_xmlns.as_str(), self.namespace.as_str()),
                ("id", definitions_id.as_str()),
                ("name", self.definitions_name.as_str()),
                ("namespace", self.namespace.as_str()),
                ("exporter", self.exporter.as_str()),
                ("exporterVersion", VERSION),
            ],
        )?;

        for (name, id) in &plan.input_order {
            let var_id = ids.claim(&format!("{id}_var"));
            xml.start("inputData", &[("id", id.as_str()), ("name", name.as_str())])?;
            xml.empty(
                "variable",
                &[("id", var_id.as_str()), ("name", name.as_str()), ("typeRef", "string")],
            )?;
            xml.end("inputData")?;
        }

        for (file, id) in &plan.sources {
            xml.empty(
                "knowledgeSource",
                &[("id", id.as_str()), ("name", file.as_str()), ("locationURI", file.as_str())],
            )?;
        }

        for group in &model.groups {
            self.write_decision(&mut xml, &mut ids, &plan, &drd, model, group)?;
        }

        xml.end("definitions")?;
        let doc = xml.finish()?;
        tracing::debug!(
            decisions = model.groups.len(),
            inputs = plan.input_order.len(),
            sources = plan.sources.len(),
            bytes = doc.len(),
            "DMN document written"
        );
        Ok(doc)
    }

    fn write_decision(
        &self,
        xml: &mut Xml,
        ids: &mut IdContext,
        plan: &IdPlan,
        drd: &DrdGraph,
        model: &DecisionModel,
        group: &RuleGroup,
    ) -> Result<(), SerializationError> {
        let decision_id = plan.decision(&group.id);
        xml.start("decision", &[("id", decision_id), ("name", group.name.as_str())])?;
        xml.text_element("description", &[], &group.description)?;

        xml.start("extensionElements", &[])?;
        self.write_traceability(xml, plan, drd, model, group)?;
        xml.end("extensionElements")?;

        let variable_id = ids.claim(&format!("{decision_id}_var"));
        xml.empty(
            "variable",
            &[("id", variable_id.as_str()), ("name", group.name.as_str()), ("typeRef", "string")],
        )?;

        for required in drd.required_by(&group.id, &SHARED_KINDS) {
            let req_id = ids.claim(&format!("{decision_id}_ir"));
            let href = format!("#{}", plan.decision(required));
            xml.start("informationRequirement", &[("id", req_id.as_str())])?;
            xml.empty("requiredDecision", &[("href", href.as_str())])?;
            xml.end("informationRequirement")?;
        }
        for variable in group.variables(&model.rules) {
            let Some(input_id) = plan.inputs.get(&variable) else {
                continue;
            };
            let req_id = ids.claim(&format!("{decision_id}_ir"));
            let href = format!("#{input_id}");
            xml.start("informationRequirement", &[("id", req_id.as_str())])?;
            xml.empty("requiredInput", &[("href", href.as_str())])?;
            xml.end("informationRequirement")?;
        }
        for file in group.files(&model.rules) {
            let Some(ks_id) = plan.sources.get(&file) else {
                continue;
            };
            let req_id = ids.claim(&format!("{decision_id}_ar"));
            let href = format!("#{ks_id}");
            xml.start("authorityRequirement", &[("id", req_id.as_str())])?;
            xml.empty("requiredAuthority", &[("href", href.as_str())])?;
            xml.end("authorityRequirement")?;
        }

        self.write_table(xml, ids, decision_id, model, group)?;
        xml.end("decision")
    }

    fn write_traceability(
        &self,
        xml: &mut Xml,
        plan: &IdPlan,
        drd: &DrdGraph,
        model: &DecisionModel,
        group: &RuleGroup,
    ) -> Result<(), SerializationError> {
        let confidence = format!("{:.4}", group.confidence);
        xml.start(
            &trace("traceability"),
            &[
                ("groupId", group.id.as_str()),
                ("category", group.category.as_str()),
                ("confidence", confidence.as_str()),
            ],
        )?;

        for rule in model.group_rules(group) {
            let start = rule.source.start_line().to_string();
            let end = rule.source.end_line().to_string();
            let confidence = format!("{:.4}", rule.confidence);
            let attrs = [
                ("ruleId", rule.id.as_str()),
                ("ruleType", rule.rule_type().as_str()),
                ("file", rule.source.file_path()),
                ("startLine", start.as_str()),
                ("endLine", end.as_str()),
                ("confidence", confidence.as_str()),
            ];
            if self.include_snippets {
                let snippet = cap_chars(rule.source.snippet(), self.snippet_max_chars);
                xml.start(&trace("source"), &attrs)?;
                xml.text_element(&trace("snippet"), &[], &snippet)?;
                xml.end(&trace("source"))?;
            } else {
                xml.empty(&trace("source"), &attrs)?;
            }
        }

        for kind in SHARED_KINDS {
            for (target, edge) in drd.outgoing(&group.id, kind) {
                let strength = format!("{:.4}", edge.strength);
                xml.empty(
                    &trace("dependency"),
                    &[
                        ("target", plan.decision(target)),
                        ("kind", kind.as_str()),
                        ("strength", strength.as_str()),
                    ],
                )?;
            }
        }

        // Temporal order has no DMN edge; record it on both ends.
        for (target, edge) in drd.outgoing(&group.id, DependencyKind::Temporal) {
            let strength = format!("{:.4}", edge.strength);
            xml.empty(
                &trace("ordering"),
                &[
                    ("kind", DependencyKind::Temporal.as_str()),
                    ("precedes", plan.decision(target)),
                    ("strength", strength.as_str()),
                ],
            )?;
        }
        for (source, edge) in drd.incoming(&group.id, DependencyKind::Temporal) {
            let strength = format!("{:.4}", edge.strength);
            xml.empty(
                &trace("ordering"),
                &[
                    ("kind", DependencyKind::Temporal.as_str()),
                    ("follows", plan.decision(source)),
                    ("strength", strength.as_str()),
                ],
            )?;
        }

        xml.end(&trace("traceability"))
    }

    fn write_table(
        &self,
        xml: &mut Xml,
        ids: &mut IdContext,
        decision_id: &str,
        model: &DecisionModel,
        group: &RuleGroup,
    ) -> Result<(), SerializationError> {
        let table_id = ids.claim(&format!("{decision_id}_table"));
        let input_id = ids.claim(&format!("{decision_id}_input"));
        let input_expr_id = ids.claim(&format!("{decision_id}_input_expr"));
        let output_id = ids.claim(&format!("{decision_id}_output"));

        xml.start("decisionTable", &[("id", table_id.as_str()), ("hitPolicy", "FIRST")])?;
        xml.start("input", &[("id", input_id.as_str()), ("label", "condition")])?;
        xml.start("inputExpression", &[("id", input_expr_id.as_str()), ("typeRef", "boolean")])?;
        xml.text_element("text", &[], "condition")?;
        xml.end("inputExpression")?;
        xml.end("input")?;
        xml.empty(
            "output",
            &[("id", output_id.as_str()), ("name", "action"), ("typeRef", "string")],
        )?;

        for rule in model.group_rules(group) {
            self.write_row(xml, ids, decision_id, rule)?;
        }
        xml.end("decisionTable")
    }

    fn write_row(
        &self,
        xml: &mut Xml,
        ids: &mut IdContext,
        decision_id: &str,
        rule: &Rule,
    ) -> Result<(), SerializationError> {
        let row_id = ids.claim(&format!("{decision_id}_{}", rule.id));
        let in_id = ids.claim(&format!("{row_id}_in"));
        let out_id = ids.claim(&format!("{row_id}_out"));
        let (output, needs_completion) = output_entry(&rule.kind);

        xml.start("rule", &[("id", row_id.as_str())])?;
        xml.text_element("description", &[], &rule.description)?;
        xml.start("extensionElements", &[])?;
        xml.empty(
            &trace("ruleRef"),
            &[
                ("ruleId", rule.id.as_str()),
                ("needsCompletion", if needs_completion { "true" } else { "false" }),
            ],
        )?;
        xml.end("extensionElements")?;
        xml.start("inputEntry", &[("id", in_id.as_str())])?;
        xml.text_element("text", &[], &rule.normalized_expression)?;
        xml.end("inputEntry")?;
        xml.start("outputEntry", &[("id", out_id.as_str())])?;
        xml.text_element("text", &[], output)?;
        xml.end("outputEntry")?;
        xml.end("rule")
    }
}

/// Row output and whether it still needs a human to fill it in.
pub fn output_entry(kind: &RuleKind) -> (&str, bool) {
    match kind {
        RuleKind::Conditional {
            action: Some(action),
            ..
        } => (action.as_str(), false),
        RuleKind::Conditional { action: None, .. } => (MANUAL_COMPLETION_PLACEHOLDER, true),
        RuleKind::Validation { .. } | RuleKind::Constraint { .. } => ("true", false),
        RuleKind::Calculation { expression, .. } => (expression.as_str(), false),
        RuleKind::Trigger { inner, .. } => output_entry(inner),
    }
}

fn trace(local: &str) -> String {
    format!("{TRACE_PREFIX}:{local}")
}

/// Ids decided before any element is written, so forward references
/// (requirements, ordering hints) resolve regardless of document order.
struct IdPlan {
    decisions: BTreeMap<String, String>,
    inputs: BTreeMap<String, String>,
    /// Input names in first-use order.
    input_order: Vec<(String, String)>,
    sources: BTreeMap<String, String>,
}

impl IdPlan {
    /// Group ids key every requirement and ordering link, so they must be
    /// unique within the model.
    fn build(model: &DecisionModel, ids: &mut IdContext) -> Result<Self, SerializationError> {
        let mut decisions = BTreeMap::new();
        for group in &model.groups {
            if decisions.contains_key(&group.id) {
                return Err(SerializationError::InvalidModel {
                    format: "dmn".to_string(),
                    message: format!("duplicate group id {}", group.id),
                });
            }
            let id = ids.claim(&format!("decision_{}", group.id));
            decisions.insert(group.id.clone(), id);
        }

        let mut inputs = BTreeMap::new();
        let mut input_order = Vec::new();
        for group in &model.groups {
            for variable in group.variables(&model.rules) {
                if inputs.contains_key(&variable) {
                    continue;
                }
                let id = ids.claim(&format!("input_{variable}"));
                inputs.insert(variable.clone(), id.clone());
                input_order.push((variable, id));
            }
        }

        let sources = model
            .grouped_files()
            .into_iter()
            .map(|file| {
                let id = ids.claim(&format!("ks_{file}"));
                (file, id)
            })
            .collect();

        Ok(Self {
            decisions,
            inputs,
            input_order,
            sources,
        })
    }

    fn decision(&self, group_id: &str) -> &str {
        self.decisions.get(group_id).map_or("", String::as_str)
    }
}

/// Thin wrapper mapping writer failures onto [`SerializationError`].
struct Xml {
    writer: Writer<Vec<u8>>,
}

impl Xml {
    fn new(pretty: bool) -> Self {
        let writer = if pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };
        Self { writer }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), SerializationError> {
        self.writer.write_event(event).map_err(xml_error)
    }

    fn decl(&mut self) -> Result<(), SerializationError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SerializationError> {
        self.write(Event::Start(element(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), SerializationError> {
        self.write(Event::Empty(element(name, attrs)))
    }

    fn end(&mut self, name: &str) -> Result<(), SerializationError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text_element(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
        text: &str,
    ) -> Result<(), SerializationError> {
        self.start(name, attrs)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    fn finish(self) -> Result<String, SerializationError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| SerializationError::Encoding {
            format: FORMAT.to_string(),
            message: e.to_string(),
        })
    }
}

fn element<'a>(name: &'a str, attrs: &[(&'a str, &'a str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for &attr in attrs {
        start.push_attribute(attr);
    }
    start
}

fn xml_error(e: impl std::fmt::Display) -> SerializationError {
    SerializationError::Xml {
        format: FORMAT.to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rulemine_core::model::{Construct, RuleDependency, SourceLocation};

    fn rule(expr: &str, file: &str, line: u32, action: Option<&str>, vars: &[&str]) -> Rule {
        let kind = RuleKind::Conditional {
            construct: Construct::If,
            condition: Some(expr.to_string()),
            action: action.map(str::to_string),
        };
        let loc = SourceLocation::new(file, line, line + 1, format!("IF {expr} THEN\n  x := 1;"));
        let mut r = Rule::new(kind, expr.to_string(), expr.to_string(), loc, 0.9);
        r.variables = vars.iter().map(|v| v.to_string()).collect();
        r
    }

    fn group(id: &str, name: &str, rules: Vec<usize>) -> RuleGroup {
        RuleGroup {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("Group of {} rules.", rules.len()),
            category: "Pricing".to_string(),
            rules,
            confidence: 1.0,
            centroid: None,
        }
    }

    fn sample() -> DecisionModel {
        DecisionModel::new(
            vec![
                rule("total > 1000", "proc.sql", 3, Some("total * 0.1"), &["total"]),
                rule("status = 'A'", "proc.sql", 7, None, &["status"]),
                rule("total > 5", "app/a.py", 2, Some("True"), &["total"]),
            ],
            vec![group("group_1", "Pricing - orders", vec![0, 1]), group("group_2", "Pricing Rules", vec![2])],
            vec![
                RuleDependency {
                    source_group_id: "group_1".to_string(),
                    target_group_id: "group_2".to_string(),
                    kind: DependencyKind::SharedTable,
                    strength: 0.5,
                },
                RuleDependency {
                    source_group_id: "group_1".to_string(),
                    target_group_id: "group_2".to_string(),
                    kind: DependencyKind::Temporal,
                    strength: 1.0,
                },
            ],
        )
    }

    fn serialize(model: &DecisionModel) -> String {
        DmnSerializer::new(&DmnConfig::default()).serialize(model).unwrap()
    }

    #[test]
    fn empty_model_is_a_minimal_document() {
        let doc = serialize(&DecisionModel::default());
        assert!(doc.starts_with("<?xml"));
        assert!(doc.contains("<definitions"));
        assert!(doc.contains(DMN_NAMESPACE));
        assert!(!doc.contains("<decision "));
    }

    #[test]
    fn decisions_rows_and_inputs() {
        let doc = serialize(&sample());
        assert_eq!(doc.matches("<decision ").count(), 2);
        assert_eq!(doc.matches("<rule ").count(), 3);
        // `total` is shared across groups, `status` is not.
        assert_eq!(doc.matches("<inputData ").count(), 2);
        assert!(doc.contains("id=\"input_total\""));
        assert!(doc.contains("<requiredDecision href=\"#decision_group_1\"/>"));
        assert!(doc.contains("precedes=\"decision_group_2\""));
        assert!(doc.contains("follows=\"decision_group_1\""));
        assert!(doc.contains("hitPolicy=\"FIRST\""));
    }

    #[test]
    fn duplicate_group_ids_are_rejected() {
        let mut model = sample();
        model.groups[1].id = model.groups[0].id.clone();
        let err = DmnSerializer::new(&DmnConfig::default())
            .serialize(&model)
            .unwrap_err();
        assert!(
            matches!(err, SerializationError::InvalidModel { ref message, .. } if message.contains("group_1")),
            "{err}"
        );
    }

    #[test]
    fn missing_action_is_flagged_for_completion() {
        let doc = serialize(&sample());
        assert!(doc.contains("&lt;manual&gt;"), "placeholder is escaped text");
        assert_eq!(doc.matches("needsCompletion=\"true\"").count(), 1);
        assert!(doc.contains("status = &apos;A&apos;") || doc.contains("status = 'A'"));
    }

    #[test]
    fn snippets_are_capped_but_lines_are_not() {
        let config = DmnConfig {
            snippet_max_chars: Some(4),
            ..Default::default()
        };
        let doc = DmnSerializer::new(&config).serialize(&sample()).unwrap();
        assert!(doc.contains("<trace:snippet>IF t</trace:snippet>"));
        assert!(doc.contains("startLine=\"3\" endLine=\"4\""));
    }

    #[test]
    fn snippets_can_be_omitted() {
        let config = DmnConfig {
            include_snippets: Some(false),
            ..Default::default()
        };
        let doc = DmnSerializer::new(&config).serialize(&sample()).unwrap();
        assert!(!doc.contains("trace:snippet"));
        assert_eq!(doc.matches("<trace:source ").count(), 3);
    }

    #[test]
    fn colliding_group_ids_get_suffixes() {
        let mut model = sample();
        model.groups[1].id = "group 1".to_string();
        let doc = serialize(&model);
        assert!(doc.contains("id=\"decision_group_1\""));
        assert!(doc.contains("id=\"decision_group_1_2\""));
    }

    #[test]
    fn output_entries_follow_the_rule_kind() {
        let check = RuleKind::Constraint {
            predicate: "price > 0".to_string(),
            constraint_name: None,
        };
        assert_eq!(output_entry(&check), ("true", false));
        let calc = RuleKind::Calculation {
            target: "total".to_string(),
            expression: "price * qty".to_string(),
        };
        let trig = calc.clone().into_trigger("t".to_string(), None, None);
        assert_eq!(output_entry(&trig), ("price * qty", false));
    }
}
