//! Dependency inference configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MIN_DEPENDENCY_STRENGTH;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct DependencyConfig {
    /// Edges weaker than this are discarded. Default: 0.1.
    pub min_strength: Option<f64>,
    /// Emit temporal edges from trigger timing. Default: true.
    pub temporal: Option<bool>,
}

impl DependencyConfig {
    pub fn effective_min_strength(&self) -> f64 {
        self.min_strength.unwrap_or(DEFAULT_MIN_DEPENDENCY_STRENGTH)
    }

    pub fn effective_temporal(&self) -> bool {
        self.temporal.unwrap_or(true)
    }
}
