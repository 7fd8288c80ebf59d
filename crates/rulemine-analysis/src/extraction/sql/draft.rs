//! Closed constructs awaiting conversion into rules.
//!
//! Drafts hold token ranges rather than text so that table information
//! learned after a construct closes (the rest of its statement, or a
//! trigger declared further down) can still be attached.

use std::ops::Range;

use rulemine_core::model::{Construct, Rule, RuleKind, TriggerTiming};
use rulemine_core::types::collections::BTreeSet;

use super::clauses::ident_name;
use super::keywords::is_keyword;
use super::lexer::{Token, TokenKind};
use crate::extraction::confidence::{score, Adjustments};
use crate::extraction::context::ExtractionContext;
use crate::extraction::describe::describe;
use crate::normalize::canonicalize;

#[derive(Debug, Clone)]
pub struct TriggerScope {
    pub name: String,
    pub timing: Option<TriggerTiming>,
    pub table: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub construct: Construct,
    /// Token range of the predicate or expression.
    pub condition: Option<Range<usize>>,
    /// Simple-CASE operand, prefixed to each branch condition.
    pub operand: Option<Range<usize>>,
    /// Conditions of earlier branches, for ELSE descriptions.
    pub siblings: Vec<Range<usize>>,
    pub body: Option<Range<usize>>,
    pub start_line: u32,
    pub end_line: u32,
    pub truncated: bool,
    pub tables: BTreeSet<String>,
    /// Bare identifiers are procedural variables rather than columns.
    pub procedural: bool,
    /// Constraint name or generated column name.
    pub label: Option<String>,
    pub trigger: Option<TriggerScope>,
    pub routine: Option<String>,
}

impl Draft {
    pub fn new(construct: Construct, start_line: u32, end_line: u32) -> Self {
        Self {
            construct,
            condition: None,
            operand: None,
            siblings: Vec::new(),
            body: None,
            start_line,
            end_line,
            truncated: false,
            tables: BTreeSet::new(),
            procedural: false,
            label: None,
            trigger: None,
            routine: None,
        }
    }
}

/// Input names found in an expression.
#[derive(Debug, Default)]
struct Identifiers {
    variables: BTreeSet<String>,
    columns: BTreeSet<String>,
    unresolved: usize,
}

pub struct DraftBuilder<'a> {
    pub toks: &'a [Token],
    pub src: &'a str,
    pub ctx: &'a ExtractionContext<'a>,
}

impl<'a> DraftBuilder<'a> {
    fn text(&self, range: &Range<usize>) -> String {
        if range.start >= range.end || range.end > self.toks.len() {
            return String::new();
        }
        let raw = &self.src[self.toks[range.start].start..self.toks[range.end - 1].end];
        collapse_whitespace(raw)
    }

    fn condition_text(&self, range: &Range<usize>, operand: Option<&Range<usize>>) -> String {
        let cond = self.text(range);
        match operand {
            Some(op) if op.start < op.end => format!("{} = {}", self.text(op), cond),
            _ => cond,
        }
    }

    pub fn build(&self, draft: &Draft) -> Rule {
        let operand = draft.operand.as_ref();
        let mut idents = Identifiers::default();
        if let Some(ref cond) = draft.condition {
            self.collect_identifiers(cond, draft.procedural, &mut idents);
            if let Some(op) = operand {
                self.collect_identifiers(op, draft.procedural, &mut idents);
            }
        }

        let action = draft
            .body
            .as_ref()
            .and_then(|b| self.extract_action(b, draft.construct));

        let (raw, normalized, kind) = match draft.construct {
            Construct::CaseElse | Construct::Else => {
                let raw = self.toks.get(draft.body.as_ref().map_or(0, |b| b.start.saturating_sub(1)))
                    .map(|t| t.text(self.src).to_string())
                    .unwrap_or_else(|| "ELSE".to_string());
                let normalized = if draft.siblings.is_empty() {
                    "else".to_string()
                } else {
                    let prior: Vec<String> = draft
                        .siblings
                        .iter()
                        .map(|s| self.condition_text(s, operand))
                        .collect();
                    canonicalize(&format!("else not ({})", prior.join(" or ")))
                };
                let kind = RuleKind::Conditional {
                    construct: draft.construct,
                    condition: None,
                    action,
                };
                (raw, normalized, kind)
            }
            Construct::GeneratedColumn => {
                let expr = draft
                    .condition
                    .as_ref()
                    .map(|c| self.text(c))
                    .unwrap_or_default();
                let target = draft.label.clone().unwrap_or_else(|| "generated".to_string());
                let expression = canonicalize(&expr);
                let normalized = canonicalize(&format!("{target} = {expression}"));
                (expr, normalized, RuleKind::Calculation { target, expression })
            }
            construct => {
                let raw = draft
                    .condition
                    .as_ref()
                    .map(|c| self.condition_text(c, operand))
                    .unwrap_or_default();
                let normalized = canonicalize(&raw);
                let kind = match construct {
                    Construct::Where | Construct::Having => RuleKind::Validation {
                        construct,
                        predicate: normalized.clone(),
                    },
                    Construct::Check => RuleKind::Constraint {
                        predicate: normalized.clone(),
                        constraint_name: draft.label.clone(),
                    },
                    _ => RuleKind::Conditional {
                        construct,
                        condition: Some(normalized.clone()),
                        action,
                    },
                };
                (raw, normalized, kind)
            }
        };

        let mut tables = draft.tables.clone();
        let kind = match draft.trigger {
            Some(ref t) => {
                if let Some(ref table) = t.table {
                    tables.insert(table.clone());
                }
                kind.into_trigger(t.name.clone(), t.timing, t.table.clone())
            }
            None => kind,
        };

        let confidence = score(
            draft.construct,
            Adjustments {
                truncated: draft.truncated,
                unresolved: idents.unresolved > 0,
                embedded: self.ctx.embedded_in.is_some(),
            },
        );
        let location = self.ctx.location(draft.start_line, draft.end_line);
        let mut rule = Rule::new(kind, raw, normalized, location, confidence);
        rule.description = describe(&rule.kind, &tables);
        rule.variables = idents.variables;
        rule.columns = idents.columns;
        rule.tables = tables;

        rule.set_metadata("construct", draft.construct.as_str());
        if draft.truncated {
            rule.set_metadata("truncated", true);
        }
        if idents.unresolved > 0 {
            rule.set_metadata("unresolved_tokens", idents.unresolved);
        }
        if let Some(ref t) = draft.trigger {
            rule.set_metadata("trigger_name", t.name.as_str());
            if let Some(timing) = t.timing {
                rule.set_metadata("trigger_timing", timing.as_str());
            }
            if let Some(ref table) = t.table {
                rule.set_metadata("trigger_table", table.as_str());
            }
        }
        if let Some(ref routine) = draft.routine {
            rule.set_metadata("routine", routine.as_str());
        }
        if let Some(lang) = self.ctx.embedded_in {
            rule.set_metadata("embedded_in", lang.name());
        }
        rule
    }

    /// The branch's action when its body is a single recognizable statement
    /// or, for CASE expressions, a value.
    fn extract_action(&self, body: &Range<usize>, construct: Construct) -> Option<String> {
        let mut end = body.end.min(self.toks.len());
        let statement_form = end > body.start && self.toks[end - 1].kind == TokenKind::Semicolon;
        while end > body.start && self.toks[end - 1].kind == TokenKind::Semicolon {
            end -= 1;
        }
        if end <= body.start {
            return None;
        }
        let slice = &self.toks[body.start..end];
        if slice.iter().any(|t| t.kind == TokenKind::Semicolon) {
            return None;
        }
        let first = &slice[0];
        if first.is_word("RETURN") {
            return (slice.len() > 1).then(|| self.text(&(body.start + 1..end)));
        }
        if first.is_word("SET") && slice.len() > 1 {
            return Some(self.text(&(body.start + 1..end)));
        }
        if first.is_any_word(&["RAISE", "SIGNAL", "THROW"]) {
            return Some(self.text(&(body.start..end)));
        }
        let assigns = slice
            .iter()
            .any(|t| t.kind == TokenKind::Operator && t.text(self.src) == ":=");
        if assigns {
            return Some(self.text(&(body.start..end)));
        }
        let in_case = matches!(construct, Construct::CaseWhen | Construct::CaseElse);
        if in_case && !statement_form {
            return Some(self.text(&(body.start..end)));
        }
        None
    }

    fn collect_identifiers(&self, range: &Range<usize>, procedural: bool, out: &mut Identifiers) {
        let toks = self.toks;
        let end = range.end.min(toks.len());
        let mut k = range.start;
        while k < end {
            let tok = &toks[k];
            let prev = k.checked_sub(1).and_then(|p| toks.get(p));
            let next = toks.get(k + 1);
            match tok.kind {
                TokenKind::Placeholder => {
                    out.unresolved += 1;
                    out.variables.insert(placeholder_name(tok.text(self.src), out.unresolved));
                }
                TokenKind::Word | TokenKind::QuotedIdent => {
                    if tok.kind == TokenKind::Word && is_keyword(&tok.upper) {
                        // NEW.col / OLD.col fall through to the qualified case.
                        if !(tok.is_any_word(&["NEW", "OLD"])
                            && next.map(|t| t.kind) == Some(TokenKind::Dot))
                        {
                            k += 1;
                            continue;
                        }
                    }
                    let after_cast = prev.is_some_and(|p| {
                        (p.kind == TokenKind::Operator && p.text(self.src) == "::") || p.is_word("AS")
                    });
                    let after_table_kw =
                        prev.is_some_and(|p| p.is_any_word(&["FROM", "JOIN", "INTO", "UPDATE", "TABLE"]));
                    let is_call = next.map(|t| t.kind) == Some(TokenKind::LParen);
                    let typed_literal = tok.kind == TokenKind::Word
                        && next.map(|t| t.kind) == Some(TokenKind::StringLit);
                    if after_cast || after_table_kw || is_call || typed_literal {
                        k += 1;
                        continue;
                    }
                    if next.map(|t| t.kind) == Some(TokenKind::Dot) {
                        if let Some(column) = toks.get(k + 2).and_then(|t| ident_name(t, self.src)) {
                            let called = toks.get(k + 3).map(|t| t.kind) == Some(TokenKind::LParen);
                            if !called {
                                out.columns.insert(column.clone());
                                out.variables.insert(column);
                            }
                            k += 3;
                            continue;
                        }
                    }
                    if let Some(name) = ident_name(tok, self.src) {
                        if !procedural {
                            out.columns.insert(name.clone());
                        }
                        out.variables.insert(name);
                    }
                }
                _ => {}
            }
            k += 1;
        }
    }
}

/// Variable name for a bind placeholder; anonymous ones are numbered.
fn placeholder_name(text: &str, ordinal: usize) -> String {
    let inner = if let Some(rest) = text.strip_prefix("%(") {
        rest.strip_suffix(")s").unwrap_or(rest)
    } else if let Some(rest) = text.strip_prefix("${") {
        rest.strip_suffix('}').unwrap_or(rest)
    } else if let Some(rest) = text.strip_prefix('{') {
        rest.strip_suffix('}').unwrap_or(rest)
    } else if text == "%s" || text == "?" {
        ""
    } else {
        text.trim_start_matches([':', '$'])
    };
    let name: String = inner
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect();
    if name.is_empty() || name.chars().all(|c| c == '_') {
        format!("param_{ordinal}")
    } else if name.chars().all(|c| c.is_ascii_digit()) {
        format!("param_{name}")
    } else {
        name.to_lowercase()
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_names() {
        assert_eq!(placeholder_name(":customer_id", 1), "customer_id");
        assert_eq!(placeholder_name(":status", 1), "status");
        assert_eq!(placeholder_name("$2", 1), "param_2");
        assert_eq!(placeholder_name("?", 3), "param_3");
        assert_eq!(placeholder_name("%(region)s", 1), "region");
        assert_eq!(placeholder_name("%s", 4), "param_4");
        assert_eq!(placeholder_name("${order.total}", 1), "order.total");
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(collapse_whitespace("a\n   b\tc "), "a b c");
    }
}
