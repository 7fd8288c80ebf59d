//! Rule extraction: per-language dispatch over SQL and application code.

pub mod app;
pub mod confidence;
pub mod context;
pub mod describe;
pub mod sql;

use rulemine_core::config::ExtractionConfig;

pub use self::context::{ExtractionContext, FileExtraction};
use crate::scanner::{Language, SourceFile};

/// Extract every rule from one file. Never fails: parse problems come back
/// in [`FileExtraction::errors`] next to the rules closed before them.
pub fn extract_file(file: &SourceFile, config: &ExtractionConfig) -> FileExtraction {
    let ctx = ExtractionContext::new(
        &file.relative_path,
        &file.content,
        config.effective_snippet_max_chars(),
    );
    let mut out = match file.language {
        Language::Sql => sql::extract_sql(&file.content, &ctx),
        lang if config.effective_app_code() => {
            app::extract_app(&file.content, lang, file.extension(), &ctx)
        }
        _ => FileExtraction::default(),
    };
    let dialect = config.effective_sql_dialect();
    for rule in &mut out.rules {
        rule.set_metadata("language", file.language.name());
        let sql_rule = file.language == Language::Sql || rule.metadata.contains_key("embedded_in");
        if sql_rule {
            rule.set_metadata("dialect", dialect);
        }
    }
    for err in &out.errors {
        tracing::warn!(file = %file.relative_path, error = %err, "extraction stopped early");
    }
    out
}
