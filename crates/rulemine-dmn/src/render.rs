//! Output formats behind one trait, selected by name.

use rulemine_core::config::DmnConfig;
use rulemine_core::errors::SerializationError;
use rulemine_core::model::DecisionModel;

use crate::json::export_json;
use crate::markdown::MarkdownReport;
use crate::serializer::DmnSerializer;

/// One rendering of a [`DecisionModel`].
pub trait Renderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// File extension used when writing, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, model: &DecisionModel) -> Result<String, SerializationError>;
}

pub struct DmnRenderer(DmnSerializer);

impl Renderer for DmnRenderer {
    fn name(&self) -> &'static str {
        "dmn"
    }

    fn extension(&self) -> &'static str {
        "dmn"
    }

    fn render(&self, model: &DecisionModel) -> Result<String, SerializationError> {
        self.0.serialize(model)
    }
}

pub struct MarkdownRenderer(MarkdownReport);

impl Renderer for MarkdownRenderer {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, model: &DecisionModel) -> Result<String, SerializationError> {
        Ok(self.0.render(model))
    }
}

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, model: &DecisionModel) -> Result<String, SerializationError> {
        export_json(model)
    }
}

/// Create a renderer by format name.
pub fn create_renderer(format: &str, config: &DmnConfig) -> Option<Box<dyn Renderer>> {
    match format {
        "dmn" => Some(Box::new(DmnRenderer(DmnSerializer::new(config)))),
        "markdown" | "md" => Some(Box::new(MarkdownRenderer(MarkdownReport::new(config)))),
        "json" => Some(Box::new(JsonRenderer)),
        _ => None,
    }
}

/// List all available format names.
pub fn available_formats() -> &'static [&'static str] {
    &["dmn", "markdown", "json"]
}

/// Expand `all` into every format; other names pass through.
pub fn expand_formats(format: &str) -> Vec<&str> {
    if format == "all" {
        available_formats().to_vec()
    } else {
        vec![format]
    }
}

/// One requested format's outcome.
#[derive(Debug)]
pub struct Rendered {
    pub format: String,
    pub extension: &'static str,
    pub output: Result<String, SerializationError>,
}

/// Render each requested format independently; one failing format never
/// stops the others.
pub fn render_all(model: &DecisionModel, formats: &[&str], config: &DmnConfig) -> Vec<Rendered> {
    formats
        .iter()
        .map(|&format| match create_renderer(format, config) {
            Some(renderer) => {
                let output = renderer.render(model);
                if let Err(ref e) = output {
                    tracing::warn!(format, error = %e, "rendering failed");
                }
                Rendered {
                    format: renderer.name().to_string(),
                    extension: renderer.extension(),
                    output,
                }
            }
            None => Rendered {
                format: format.to_string(),
                extension: "",
                output: Err(SerializationError::UnknownFormat {
                    format: format.to_string(),
                }),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_format_has_a_renderer() {
        let config = DmnConfig::default();
        for format in available_formats() {
            let renderer = create_renderer(format, &config).unwrap();
            assert_eq!(renderer.name(), *format);
        }
        assert!(create_renderer("svg", &config).is_none());
    }

    #[test]
    fn unknown_format_does_not_block_others() {
        let results = render_all(&DecisionModel::default(), &["svg", "json"], &DmnConfig::default());
        assert!(matches!(results[0].output, Err(SerializationError::UnknownFormat { .. })));
        assert!(results[1].output.is_ok());
        assert_eq!(results[1].extension, "json");
    }

    #[test]
    fn all_expands() {
        assert_eq!(expand_formats("all"), vec!["dmn", "markdown", "json"]);
        assert_eq!(expand_formats("json"), vec!["json"]);
    }
}
