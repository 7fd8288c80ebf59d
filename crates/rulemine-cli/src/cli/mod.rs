//! CLI module for rulemine
//!
//! Provides command-line interface for:
//! - analyze: extract rules and write DMN, Markdown or JSON
//! - validate: check a generated document against the source tree
//! - config: print the resolved configuration

mod args;
mod commands;
mod errors;

pub use commands::run;
pub use errors::CliErrorCode;
