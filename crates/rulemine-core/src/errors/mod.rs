//! Error handling for rulemine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod enrichment_error;
pub mod error_code;
pub mod grouping_error;
pub mod parse_error;
pub mod pipeline_error;
pub mod scan_error;
pub mod serialization_error;
pub mod validation_error;

pub use config_error::ConfigError;
pub use enrichment_error::EnrichmentError;
pub use error_code::RulemineErrorCode;
pub use grouping_error::GroupingError;
pub use parse_error::ParseError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use scan_error::ScanError;
pub use serialization_error::SerializationError;
pub use validation_error::ValidationError;
