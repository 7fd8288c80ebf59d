//! Provenance of an extracted rule.

use serde::{Deserialize, Serialize};

/// Where a rule came from: repository-relative file path, inclusive 1-based
/// line range, and the verbatim (capped) text of those lines.
///
/// Immutable once built; owned by exactly one `Rule`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    file_path: String,
    start_line: u32,
    end_line: u32,
    snippet: String,
}

impl SourceLocation {
    /// Builds a location, ordering the two line numbers so that
    /// `start_line <= end_line` always holds. Line 0 is clamped to 1.
    pub fn new(file_path: impl Into<String>, start_line: u32, end_line: u32, snippet: String) -> Self {
        let (a, b) = (start_line.max(1), end_line.max(1));
        Self {
            file_path: file_path.into(),
            start_line: a.min(b),
            end_line: a.max(b),
            snippet,
        }
    }

    /// Builds a location whose snippet is cut from `content`
    /// (lines `start..=end`, joined with `\n`, capped at `max_chars`).
    pub fn from_content(
        file_path: impl Into<String>,
        content: &str,
        start_line: u32,
        end_line: u32,
        max_chars: usize,
    ) -> Self {
        let mut loc = Self::new(file_path, start_line, end_line, String::new());
        loc.snippet = cap_chars(&line_slice(content, loc.start_line, loc.end_line), max_chars);
        loc
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    /// Number of lines covered.
    pub fn line_span(&self) -> u32 {
        self.end_line - self.start_line + 1
    }

    /// Same file, and the ranges intersect or touch (`a.end + 1 == b.start`).
    pub fn overlaps_or_adjacent(&self, other: &SourceLocation) -> bool {
        self.file_path == other.file_path
            && self.start_line <= other.end_line.saturating_add(1)
            && other.start_line <= self.end_line.saturating_add(1)
    }

    /// Same file, and the ranges share at least one line.
    pub fn overlaps(&self, other: &SourceLocation) -> bool {
        self.file_path == other.file_path
            && self.start_line <= other.end_line
            && other.start_line <= self.end_line
    }
}

/// Lines `start..=end` (1-based) of `content`, joined with `\n`.
/// Out-of-range lines are simply absent.
pub fn line_slice(content: &str, start: u32, end: u32) -> String {
    let skip = start.saturating_sub(1) as usize;
    let take = (end.saturating_sub(start) as usize) + 1;
    content
        .lines()
        .skip(skip)
        .take(take)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn cap_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
