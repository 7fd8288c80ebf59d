//! The canonical unit of extracted business logic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use super::source::SourceLocation;

/// Field separator in the id pre-image (ASCII unit separator).
const ID_FIELD_SEPARATOR: u8 = 0x1F;

/// Coarse classification of a rule. Derived from [`RuleKind`], never stored
/// independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Conditional,
    Validation,
    Constraint,
    Calculation,
    Trigger,
}

impl RuleType {
    pub const ALL: [RuleType; 5] = [
        RuleType::Conditional,
        RuleType::Validation,
        RuleType::Constraint,
        RuleType::Calculation,
        RuleType::Trigger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Conditional => "conditional",
            RuleType::Validation => "validation",
            RuleType::Constraint => "constraint",
            RuleType::Calculation => "calculation",
            RuleType::Trigger => "trigger",
        }
    }

    /// Title-cased label, used as a fallback group category.
    pub fn title(&self) -> &'static str {
        match self {
            RuleType::Conditional => "Conditional",
            RuleType::Validation => "Validation",
            RuleType::Constraint => "Constraint",
            RuleType::Calculation => "Calculation",
            RuleType::Trigger => "Trigger",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The syntactic construct a rule was recognized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Construct {
    CaseWhen,
    CaseElse,
    If,
    Elsif,
    Else,
    Where,
    Having,
    Check,
    TriggerWhen,
    GeneratedColumn,
    AppConditional,
}

impl Construct {
    pub fn as_str(&self) -> &'static str {
        match self {
            Construct::CaseWhen => "case_when",
            Construct::CaseElse => "case_else",
            Construct::If => "if",
            Construct::Elsif => "elsif",
            Construct::Else => "else",
            Construct::Where => "where",
            Construct::Having => "having",
            Construct::Check => "check",
            Construct::TriggerWhen => "trigger_when",
            Construct::GeneratedColumn => "generated_column",
            Construct::AppConditional => "app_conditional",
        }
    }

    /// Branches without an explicit predicate.
    pub fn is_fallthrough(&self) -> bool {
        matches!(self, Construct::CaseElse | Construct::Else)
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `BEFORE` / `AFTER` / `INSTEAD OF` for trigger rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerTiming::Before => "before",
            TriggerTiming::After => "after",
            TriggerTiming::InsteadOf => "instead_of",
        }
    }
}

/// Closed tagged union over the rule types, carrying what each kind knows.
///
/// Normalization and serialization match on this exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum RuleKind {
    /// A CASE/IF branch or an application-code conditional.
    /// `condition` is `None` for ELSE branches.
    Conditional {
        construct: Construct,
        condition: Option<String>,
        action: Option<String>,
    },
    /// One top-level conjunct of a WHERE or HAVING clause.
    Validation {
        construct: Construct,
        predicate: String,
    },
    /// A CHECK constraint.
    Constraint {
        predicate: String,
        constraint_name: Option<String>,
    },
    /// A derived value, e.g. a generated column.
    Calculation { target: String, expression: String },
    /// Any conditional found inside a trigger, or the trigger's own WHEN
    /// clause. `inner` keeps the nested construct's natural kind.
    Trigger {
        trigger_name: String,
        timing: Option<TriggerTiming>,
        table: Option<String>,
        inner: Box<RuleKind>,
    },
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleKind::Conditional { .. } => RuleType::Conditional,
            RuleKind::Validation { .. } => RuleType::Validation,
            RuleKind::Constraint { .. } => RuleType::Constraint,
            RuleKind::Calculation { .. } => RuleType::Calculation,
            RuleKind::Trigger { .. } => RuleType::Trigger,
        }
    }

    pub fn construct(&self) -> Construct {
        match self {
            RuleKind::Conditional { construct, .. } | RuleKind::Validation { construct, .. } => {
                *construct
            }
            RuleKind::Constraint { .. } => Construct::Check,
            RuleKind::Calculation { .. } => Construct::GeneratedColumn,
            RuleKind::Trigger { inner, .. } => inner.construct(),
        }
    }

    /// The predicate text, if the construct has one.
    pub fn predicate(&self) -> Option<&str> {
        match self {
            RuleKind::Conditional { condition, .. } => condition.as_deref(),
            RuleKind::Validation { predicate, .. } | RuleKind::Constraint { predicate, .. } => {
                Some(predicate)
            }
            RuleKind::Calculation { .. } => None,
            RuleKind::Trigger { inner, .. } => inner.predicate(),
        }
    }

    /// The extracted action or value, if any.
    pub fn action(&self) -> Option<&str> {
        match self {
            RuleKind::Conditional { action, .. } => action.as_deref(),
            RuleKind::Validation { .. } | RuleKind::Constraint { .. } => None,
            RuleKind::Calculation { expression, .. } => Some(expression),
            RuleKind::Trigger { inner, .. } => inner.action(),
        }
    }

    /// Timing of the enclosing trigger, for trigger rules.
    pub fn trigger_timing(&self) -> Option<TriggerTiming> {
        match self {
            RuleKind::Trigger { timing, .. } => *timing,
            _ => None,
        }
    }

    /// Wrap this kind as the body of a trigger.
    pub fn into_trigger(
        self,
        trigger_name: String,
        timing: Option<TriggerTiming>,
        table: Option<String>,
    ) -> RuleKind {
        match self {
            already @ RuleKind::Trigger { .. } => already,
            inner => RuleKind::Trigger {
                trigger_name,
                timing,
                table,
                inner: Box::new(inner),
            },
        }
    }
}

/// One discrete unit of extracted logic with exact provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Deterministic; see [`compute_rule_id`].
    pub id: String,
    pub kind: RuleKind,
    pub description: String,
    pub raw_expression: String,
    pub normalized_expression: String,
    pub variables: BTreeSet<String>,
    pub tables: BTreeSet<String>,
    pub columns: BTreeSet<String>,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
    pub source: SourceLocation,
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Absent until enrichment runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Rule {
    /// Builds a rule, computing its id and clamping its confidence.
    pub fn new(
        kind: RuleKind,
        raw_expression: String,
        normalized_expression: String,
        source: SourceLocation,
        confidence: f64,
    ) -> Self {
        let id = compute_rule_id(&normalized_expression, &source);
        Self {
            id,
            kind,
            description: String::new(),
            raw_expression,
            normalized_expression,
            variables: BTreeSet::new(),
            tables: BTreeSet::new(),
            columns: BTreeSet::new(),
            confidence: clamp_confidence(confidence),
            source,
            metadata: BTreeMap::new(),
            embedding: None,
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.kind.rule_type()
    }

    /// Recompute the id after `normalized_expression` changed.
    pub fn refresh_id(&mut self) {
        self.id = compute_rule_id(&self.normalized_expression, &self.source);
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Values of the `domain_concepts` metadata list, if enrichment set it.
    pub fn domain_concepts(&self) -> Vec<&str> {
        self.metadata
            .get("domain_concepts")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|c| c.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Stable rule id: `rule_` + 16 hex digits of xxh3-64 over
/// `normalized_expression ␟ file_path ␟ start_line ␟ end_line`,
/// where ␟ is the byte 0x1F and line numbers are decimal ASCII.
pub fn compute_rule_id(normalized_expression: &str, source: &SourceLocation) -> String {
    let start = source.start_line().to_string();
    let end = source.end_line().to_string();
    let mut buf = Vec::with_capacity(
        normalized_expression.len() + source.file_path().len() + start.len() + end.len() + 3,
    );
    buf.extend_from_slice(normalized_expression.as_bytes());
    buf.push(ID_FIELD_SEPARATOR);
    buf.extend_from_slice(source.file_path().as_bytes());
    buf.push(ID_FIELD_SEPARATOR);
    buf.extend_from_slice(start.as_bytes());
    buf.push(ID_FIELD_SEPARATOR);
    buf.extend_from_slice(end.as_bytes());
    format!("rule_{:016x}", xxh3_64(&buf))
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(start: u32, end: u32) -> SourceLocation {
        SourceLocation::new("proc.sql", start, end, String::new())
    }

    #[test]
    fn id_is_stable_and_location_sensitive() {
        let a = compute_rule_id("total > 1000", &loc(3, 4));
        let b = compute_rule_id("total > 1000", &loc(3, 4));
        let c = compute_rule_id("total > 1000", &loc(5, 6));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("rule_") && a.len() == 21, "unexpected id {a}");
    }

    #[test]
    fn separator_prevents_field_bleed() {
        // "a" + "b.sql" must not collide with "ab" + ".sql".
        let x = compute_rule_id("a", &SourceLocation::new("b.sql", 1, 1, String::new()));
        let y = compute_rule_id("ab", &SourceLocation::new(".sql", 1, 1, String::new()));
        assert_ne!(x, y);
    }

    #[test]
    fn trigger_wrapping_forces_rule_type() {
        let inner = RuleKind::Conditional {
            construct: Construct::If,
            condition: Some("new.qty > 0".into()),
            action: None,
        };
        let kind = inner.into_trigger("trg".into(), Some(TriggerTiming::Before), None);
        assert_eq!(kind.rule_type(), RuleType::Trigger);
        assert_eq!(kind.construct(), Construct::If);
        assert_eq!(kind.predicate(), Some("new.qty > 0"));
    }

    #[test]
    fn confidence_is_clamped() {
        let r = Rule::new(
            RuleKind::Constraint {
                predicate: "price > 0".into(),
                constraint_name: None,
            },
            "price > 0".into(),
            "price > 0".into(),
            loc(1, 1),
            1.7,
        );
        assert_eq!(r.confidence, 1.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        assert_eq!(clamp_confidence(-0.3), 0.0);
    }
}
