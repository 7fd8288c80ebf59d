//! rulemine-analysis: the extraction engine and the stages that turn its
//! rules into a decision model.
//!
//! - `scanner`: repository walk, language detection, ignore rules
//! - `extraction`: SQL state machine and application-code extraction
//! - `normalize`: canonical expressions, deduplication, confidence filter
//! - `enrichment`: feature providers and domain concepts
//! - `grouping`: grouping providers and group naming
//! - `dependencies`: edges between groups
//! - `pipeline`: the driver tying the stages together

pub mod dependencies;
pub mod enrichment;
pub mod extraction;
pub mod grouping;
pub mod normalize;
pub mod pipeline;
pub mod scanner;

pub use pipeline::{AnalysisOutput, Pipeline, RunStats};
