//! rulemine-dmn: DMN 1.3 serialization of a decision model, companion
//! Markdown and JSON renderings, and trace validation of generated
//! documents against a source tree.

pub mod graph;
pub mod ids;
pub mod json;
pub mod markdown;
pub mod render;
pub mod report;
pub mod serializer;
pub mod validator;

pub use graph::DrdGraph;
pub use ids::IdContext;
pub use json::{export_json, import_json};
pub use markdown::MarkdownReport;
pub use render::{available_formats, create_renderer, expand_formats, render_all, Rendered, Renderer};
pub use report::{Finding, FindingStatus, ValidationReport};
pub use serializer::DmnSerializer;
pub use validator::{read_references, TraceReference, TraceValidator};
