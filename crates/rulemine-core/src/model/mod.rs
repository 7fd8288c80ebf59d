//! Data model shared by extraction, grouping and serialization.

pub mod decision_model;
pub mod group;
pub mod rule;
pub mod source;

pub use decision_model::{DecisionModel, ModelMetadata};
pub use group::{DependencyKind, RuleDependency, RuleGroup};
pub use rule::{
    clamp_confidence, compute_rule_id, Construct, Rule, RuleKind, RuleType, TriggerTiming,
};
pub use source::{cap_chars, line_slice, SourceLocation};
