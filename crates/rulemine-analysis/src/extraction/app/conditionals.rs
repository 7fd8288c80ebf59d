//! Native conditional statements in application code.
//!
//! Python `if`/`elif` bodies end by indentation; C-family `if (...)`
//! conditions and bodies are found by bracket matching. Both skip matches
//! inside strings and comments.

use once_cell::sync::Lazy;
use regex::Regex;

use super::literals::LiteralScan;

static PY_IF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?:if|elif)\s+(?P<cond>.+?)\s*:(?P<inline>[^#]*)").unwrap()
});

static BRACE_IF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bif\s*\(").unwrap());

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][\w$.\[\]'\x22]*\s*(?:[-+*/%]?=)\s*[^=\s]").unwrap()
});

/// One matched conditional, lines relative to the file.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeConditional {
    pub condition: String,
    pub action: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
}

/// Byte offsets of line starts, for byte-to-line mapping.
struct LineIndex(Vec<usize>);

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self(starts)
    }

    fn line_of(&self, byte: usize) -> u32 {
        self.0.partition_point(|&s| s <= byte) as u32
    }
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Action of a single-statement body: a returned value, a raised or
/// thrown error, or an assignment.
fn single_statement_action(statement: &str) -> Option<String> {
    let stmt = statement.trim().trim_end_matches(';').trim();
    if stmt.is_empty() || stmt.contains(';') {
        return None;
    }
    if let Some(value) = stmt.strip_prefix("return ") {
        let value = value.trim();
        return (!value.is_empty()).then(|| value.to_string());
    }
    if stmt.starts_with("raise ") || stmt.starts_with("throw ") || ASSIGNMENT.is_match(stmt) {
        return Some(stmt.to_string());
    }
    None
}

pub fn python_conditionals(source: &str, scan: &LiteralScan) -> Vec<NativeConditional> {
    let lines: Vec<&str> = source.split('\n').collect();
    let index = LineIndex::new(source);
    let mut found = Vec::new();
    for (n, line) in lines.iter().enumerate() {
        let Some(caps) = PY_IF.captures(line) else {
            continue;
        };
        let line_start = index.0[n];
        if scan.opaque_end(line_start + indent_width(line)).is_some() {
            continue;
        }
        let indent = indent_width(line);
        let inline = caps.name("inline").map_or("", |m| m.as_str().trim());
        let condition = caps.name("cond").map_or("", |m| m.as_str()).trim().to_string();
        if condition.is_empty() {
            continue;
        }
        let start_line = n as u32 + 1;

        if !inline.is_empty() {
            found.push(NativeConditional {
                condition,
                action: single_statement_action(inline),
                start_line,
                end_line: start_line,
            });
            continue;
        }

        let mut end = n;
        let mut body = Vec::new();
        for (m, next) in lines.iter().enumerate().skip(n + 1) {
            let trimmed = next.trim();
            if trimmed.is_empty() {
                continue;
            }
            if indent_width(next) <= indent {
                break;
            }
            end = m;
            if !trimmed.starts_with('#') {
                body.push(trimmed);
            }
        }
        let action = match body.as_slice() {
            [only] => single_statement_action(only),
            _ => None,
        };
        found.push(NativeConditional {
            condition,
            action,
            start_line,
            end_line: end as u32 + 1,
        });
    }
    found
}

/// Index just past the bracket closing the one at `open`, skipping
/// strings and comments.
fn matching_close(source: &str, open: usize, scan: &LiteralScan) -> Option<usize> {
    let bytes = source.as_bytes();
    let (open_ch, close_ch) = match bytes.get(open)? {
        b'(' => (b'(', b')'),
        b'{' => (b'{', b'}'),
        _ => return None,
    };
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(end) = scan.opaque_end(i) {
            i = end.max(i + 1);
            continue;
        }
        if bytes[i] == open_ch {
            depth += 1;
        } else if bytes[i] == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i + 1);
            }
        }
        i += 1;
    }
    None
}

/// `if (...)` conditionals of Java, JavaScript and TypeScript.
pub fn brace_conditionals(source: &str, scan: &LiteralScan) -> Vec<NativeConditional> {
    let index = LineIndex::new(source);
    let bytes = source.as_bytes();
    let mut found = Vec::new();
    for m in BRACE_IF.find_iter(source) {
        if scan.opaque_end(m.start()).is_some() {
            continue;
        }
        let open = m.end() - 1;
        let Some(close) = matching_close(source, open, scan) else {
            continue;
        };
        let condition = source[open + 1..close - 1].split_whitespace().collect::<Vec<_>>().join(" ");
        if condition.is_empty() {
            continue;
        }

        let mut body_start = close;
        while body_start < bytes.len() && bytes[body_start].is_ascii_whitespace() {
            body_start += 1;
        }
        let (body, body_end) = if bytes.get(body_start) == Some(&b'{') {
            match matching_close(source, body_start, scan) {
                Some(end) => (&source[body_start + 1..end - 1], end),
                None => (&source[body_start..], source.len()),
            }
        } else {
            let mut end = body_start;
            while end < bytes.len() {
                if let Some(skip) = scan.opaque_end(end) {
                    end = skip.max(end + 1);
                    continue;
                }
                if bytes[end] == b';' || bytes[end] == b'\n' {
                    break;
                }
                end += 1;
            }
            let end = (end + 1).min(bytes.len());
            (&source[body_start..end], end)
        };

        found.push(NativeConditional {
            condition,
            action: single_statement_action(body),
            start_line: index.line_of(m.start()),
            end_line: index.line_of(body_end.saturating_sub(1)).max(index.line_of(m.start())),
        });
    }
    found
}
