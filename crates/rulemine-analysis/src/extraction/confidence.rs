//! Extraction confidence scores.

use rulemine_core::model::{clamp_confidence, Construct};

/// Penalty for a branch still open at end of input.
pub const TRUNCATION_PENALTY: f64 = 0.20;
/// Penalty when the condition contains bind placeholders or interpolation.
pub const UNRESOLVED_PENALTY: f64 = 0.15;
/// Multiplier for SQL found inside application string literals.
pub const EMBEDDED_FACTOR: f64 = 0.95;

/// Base score per construct. Explicit predicates score higher than
/// fallthrough branches; declared constraints highest.
pub fn base_confidence(construct: Construct) -> f64 {
    match construct {
        Construct::Check => 0.95,
        Construct::CaseWhen | Construct::If | Construct::Elsif => 0.90,
        Construct::TriggerWhen | Construct::GeneratedColumn => 0.90,
        Construct::Where | Construct::Having => 0.85,
        Construct::CaseElse | Construct::Else => 0.80,
        Construct::AppConditional => 0.70,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Adjustments {
    pub truncated: bool,
    pub unresolved: bool,
    pub embedded: bool,
}

pub fn score(construct: Construct, adj: Adjustments) -> f64 {
    let mut value = base_confidence(construct);
    if adj.truncated {
        value -= TRUNCATION_PENALTY;
    }
    if adj.unresolved {
        value -= UNRESOLVED_PENALTY;
    }
    if adj.embedded {
        value *= EMBEDDED_FACTOR;
    }
    clamp_confidence(value)
}
