//! Structured JSON export. Reads back into a [`DecisionModel`] unchanged.

use rulemine_core::errors::SerializationError;
use rulemine_core::model::DecisionModel;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct GeneratorInfo<'a> {
    name: &'a str,
    version: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonExport<'a> {
    generator: GeneratorInfo<'a>,
    #[serde(flatten)]
    model: &'a DecisionModel,
}

pub fn export_json(model: &DecisionModel) -> Result<String, SerializationError> {
    let export = JsonExport {
        generator: GeneratorInfo {
            name: &model.metadata.generator,
            version: &model.metadata.version,
        },
        model,
    };
    serde_json::to_string_pretty(&export).map_err(|e| SerializationError::Json {
        message: e.to_string(),
    })
}

/// Parse an export produced by [`export_json`]. The `generator` block is
/// informational and ignored.
pub fn import_json(text: &str) -> Result<DecisionModel, SerializationError> {
    serde_json::from_str(text).map_err(|e| SerializationError::Json {
        message: e.to_string(),
    })
}
