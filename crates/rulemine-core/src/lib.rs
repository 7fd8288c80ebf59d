//! rulemine-core: shared model, errors, configuration, tracing setup, and
//! constants for the rulemine business-rule extraction engine.

pub mod config;
pub mod constants;
pub mod errors;
pub mod model;
pub mod tracing;
pub mod traits;
pub mod types;
