//! End-to-end analysis of a repository into a [`DecisionModel`](rulemine_core::model::DecisionModel).

pub mod driver;
pub mod stats;

pub use driver::{AnalysisOutput, Pipeline};
pub use stats::RunStats;
