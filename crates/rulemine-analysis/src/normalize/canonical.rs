//! Canonical text form of an expression.
//!
//! Whitespace runs collapse to one space; everything outside quotes is
//! lowercased; comparison operators are unified (`==` → `=`, `<>`/`^=` → `!=`)
//! and surrounded by single spaces; no space inside parentheses or before a
//! comma; trailing semicolons are dropped. Applying it twice changes nothing.

/// Operators recognized at a position, longest first, with their canonical
/// spelling. `None` means "copy through unchanged and unspaced".
const OPERATORS: &[(&str, Option<&str>)] = &[
    ("<=>", Some("<=>")),
    ("===", Some("=")),
    ("!==", Some("!=")),
    ("->>", None),
    ("<<", None),
    (">>", None),
    ("->", None),
    ("==", Some("=")),
    ("!=", Some("!=")),
    ("<>", Some("!=")),
    ("^=", Some("!=")),
    ("<=", Some("<=")),
    (">=", Some(">=")),
    (":=", Some(":=")),
    ("=>", Some("=>")),
    ("::", None),
    ("<", Some("<")),
    (">", Some(">")),
    ("=", Some("=")),
];

pub fn canonicalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            pending_space = !out.is_empty() && !out.ends_with('(');
            continue;
        }
        match c {
            '\'' | '"' | '`' => {
                flush_space(&mut out, &mut pending_space);
                out.push(c);
                // Copy verbatim up to and including the matching quote;
                // a doubled quote is an escape.
                while let Some((_, q)) = chars.next() {
                    out.push(q);
                    if q == c {
                        if chars.peek().map(|&(_, n)| n) == Some(c) {
                            if let Some((_, n)) = chars.next() {
                                out.push(n);
                            }
                            continue;
                        }
                        break;
                    }
                }
            }
            '(' => {
                flush_space(&mut out, &mut pending_space);
                out.push('(');
            }
            ')' => {
                pending_space = false;
                trim_end_spaces(&mut out);
                out.push(')');
            }
            ',' => {
                trim_end_spaces(&mut out);
                out.push(',');
                pending_space = true;
            }
            _ => {
                if let Some((op, canon)) = match_operator(&text[i..]) {
                    for _ in 1..op.chars().count() {
                        chars.next();
                    }
                    match canon {
                        Some(canon) => {
                            trim_end_spaces(&mut out);
                            if !out.is_empty() && !out.ends_with('(') {
                                out.push(' ');
                            }
                            out.push_str(canon);
                            pending_space = true;
                        }
                        None => {
                            flush_space(&mut out, &mut pending_space);
                            out.push_str(op);
                        }
                    }
                    continue;
                }
                flush_space(&mut out, &mut pending_space);
                out.extend(c.to_lowercase());
            }
        }
    }

    let mut result = out.trim().to_string();
    while result.ends_with(';') {
        result.pop();
        let trimmed = result.trim_end().len();
        result.truncate(trimmed);
    }
    result
}

fn match_operator(rest: &str) -> Option<(&'static str, Option<&'static str>)> {
    OPERATORS
        .iter()
        .find(|(op, _)| rest.starts_with(op))
        .map(|&(op, canon)| (op, canon))
}

fn flush_space(out: &mut String, pending: &mut bool) {
    if *pending && !out.is_empty() && !out.ends_with(' ') && !out.ends_with('(') {
        out.push(' ');
    }
    *pending = false;
}

fn trim_end_spaces(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
}
