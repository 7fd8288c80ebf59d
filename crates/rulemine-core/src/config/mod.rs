//! Configuration system for rulemine.
//! TOML-based, 4-layer resolution: CLI > env > project > user > defaults.

pub mod dependency_config;
pub mod dmn_config;
pub mod enrichment_config;
pub mod extraction_config;
pub mod grouping_config;
pub mod rulemine_config;
pub mod scan_config;

pub use dependency_config::DependencyConfig;
pub use dmn_config::DmnConfig;
pub use enrichment_config::EnrichmentConfig;
pub use extraction_config::ExtractionConfig;
pub use grouping_config::GroupingConfig;
pub use rulemine_config::{CliOverrides, RulemineConfig};
pub use scan_config::ScanConfig;
