//! Per-file extraction context and output.

use rulemine_core::errors::ParseError;
use rulemine_core::model::{Rule, SourceLocation};

use crate::scanner::Language;

/// What an extractor needs to know about the file it is reading.
///
/// For SQL embedded in application code, `host_content` is the whole host
/// file and `line_offset` maps literal-relative lines onto host lines, so
/// snippets always come from the file on disk.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionContext<'a> {
    pub file_path: &'a str,
    pub host_content: &'a str,
    pub line_offset: u32,
    pub snippet_max_chars: usize,
    /// Host language when the SQL came from a string literal.
    pub embedded_in: Option<Language>,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(file_path: &'a str, host_content: &'a str, snippet_max_chars: usize) -> Self {
        Self {
            file_path,
            host_content,
            line_offset: 0,
            snippet_max_chars,
            embedded_in: None,
        }
    }

    /// Context for a literal starting on `host_line` (1-based) of this file.
    pub fn embedded(&self, host_line: u32, language: Language) -> Self {
        Self {
            line_offset: host_line.saturating_sub(1),
            embedded_in: Some(language),
            ..*self
        }
    }

    pub fn host_line(&self, line: u32) -> u32 {
        line + self.line_offset
    }

    /// Location for lines given relative to the extractor's input.
    pub fn location(&self, start_line: u32, end_line: u32) -> SourceLocation {
        SourceLocation::from_content(
            self.file_path,
            self.host_content,
            self.host_line(start_line),
            self.host_line(end_line),
            self.snippet_max_chars,
        )
    }
}

/// Rules from one file plus the non-fatal errors met on the way.
#[derive(Debug, Default)]
pub struct FileExtraction {
    pub rules: Vec<Rule>,
    pub errors: Vec<ParseError>,
}

impl FileExtraction {
    pub fn merge(&mut self, other: FileExtraction) {
        self.rules.extend(other.rules);
        self.errors.extend(other.errors);
    }
}
