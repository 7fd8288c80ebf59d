//! String literals and comments of application code, via tree-sitter.

use std::ops::Range;
use std::path::PathBuf;

use rulemine_core::errors::ParseError;
use tree_sitter::{Node, Parser};

use crate::scanner::Language;

/// Text of one string literal with its delimiters removed.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub content: String,
    /// 1-based host line of the opening delimiter.
    pub host_line: u32,
    pub byte_range: Range<usize>,
}

#[derive(Debug, Default)]
pub struct LiteralScan {
    pub literals: Vec<StringLiteral>,
    /// Byte ranges of strings and comments, in source order. Conditional
    /// matching skips anything inside them.
    pub opaque: Vec<Range<usize>>,
}

impl LiteralScan {
    /// End of the opaque range containing `byte`, if any.
    pub fn opaque_end(&self, byte: usize) -> Option<usize> {
        let idx = self.opaque.partition_point(|r| r.end <= byte);
        self.opaque
            .get(idx)
            .filter(|r| r.start <= byte)
            .map(|r| r.end)
    }
}

fn is_string_kind(language: Language, kind: &str) -> bool {
    match language {
        Language::Python => kind == "string",
        Language::Java => matches!(kind, "string_literal" | "text_block"),
        Language::JavaScript | Language::TypeScript => {
            matches!(kind, "string" | "template_string")
        }
        Language::Sql => false,
    }
}

fn is_comment_kind(kind: &str) -> bool {
    matches!(kind, "comment" | "line_comment" | "block_comment")
}

/// Parse `source` and collect its string literals and comments.
pub fn scan_literals(
    source: &str,
    language: Language,
    ext: Option<&str>,
    path: &str,
) -> Result<LiteralScan, ParseError> {
    let grammar = language
        .ts_language_for_ext(ext)
        .ok_or_else(|| ParseError::UnsupportedLanguage {
            extension: ext.unwrap_or_default().to_string(),
        })?;
    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| ParseError::TreeSitterError {
            path: PathBuf::from(path),
            message: e.to_string(),
        })?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::TreeSitterError {
            path: PathBuf::from(path),
            message: "parser returned no tree".to_string(),
        })?;

    let mut scan = LiteralScan::default();
    let mut stack: Vec<Node> = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        let kind = node.kind();
        if is_string_kind(language, kind) {
            let range = node.byte_range();
            let text = source.get(range.clone()).unwrap_or_default();
            scan.literals.push(StringLiteral {
                content: strip_delimiters(text).to_string(),
                host_line: node.start_position().row as u32 + 1,
                byte_range: range.clone(),
            });
            scan.opaque.push(range);
            continue;
        }
        if is_comment_kind(kind) {
            scan.opaque.push(node.byte_range());
            continue;
        }
        let count = node.child_count();
        for i in (0..count).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
    scan.opaque.sort_by_key(|r| r.start);
    Ok(scan)
}

/// Remove string prefixes (`f`, `r`, `b`, `u`) and matching quote
/// delimiters. The content keeps its own line breaks.
fn strip_delimiters(text: &str) -> &str {
    let body = text.trim_start_matches(['r', 'R', 'b', 'B', 'u', 'U', 'f', 'F']);
    for delim in ["\"\"\"", "'''", "\"", "'", "`"] {
        if body.len() >= 2 * delim.len() && body.starts_with(delim) && body.ends_with(delim) {
            return &body[delim.len()..body.len() - delim.len()];
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefixes_and_quotes() {
        assert_eq!(strip_delimiters("f\"SELECT {x}\""), "SELECT {x}");
        assert_eq!(strip_delimiters("'''\nSELECT 1\n'''"), "\nSELECT 1\n");
        assert_eq!(strip_delimiters("`a ${b}`"), "a ${b}");
        assert_eq!(strip_delimiters("\"\"\"x\"\"\""), "x");
    }

    #[test]
    fn python_strings_and_comments() {
        let src = "# if total > 1: pass\nq = \"SELECT 1\"\nr = f'{a}'\n";
        let scan = scan_literals(src, Language::Python, Some("py"), "a.py").unwrap();
        let contents: Vec<_> = scan.literals.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, vec!["SELECT 1", "{a}"]);
        assert_eq!(scan.literals[0].host_line, 2);
        assert_eq!(scan.opaque.len(), 3);
        assert!(scan.opaque_end(3).is_some(), "comment bytes are opaque");
        assert!(scan.opaque_end(src.find("q =").unwrap()).is_none());
    }

    #[test]
    fn java_text_block_line() {
        let src = "class A {\n  String q = \"\"\"\n    SELECT 1\n    \"\"\";\n}\n";
        let scan = scan_literals(src, Language::Java, Some("java"), "A.java").unwrap();
        assert_eq!(scan.literals.len(), 1);
        assert_eq!(scan.literals[0].host_line, 2);
        assert!(scan.literals[0].content.contains("SELECT 1"));
    }
}
