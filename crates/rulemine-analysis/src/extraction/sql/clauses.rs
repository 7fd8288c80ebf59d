//! Lookahead helpers over the token stream: table references, DDL headers,
//! and the procedural-IF test. None of them consume tokens.

use rulemine_core::model::TriggerTiming;

use super::keywords::{is_keyword, is_type_name};
use super::lexer::{Token, TokenKind};

/// Identifier text, lowercased unless quoted.
pub fn ident_name(tok: &Token, src: &str) -> Option<String> {
    match tok.kind {
        TokenKind::Word => Some(tok.text(src).to_ascii_lowercase()),
        TokenKind::QuotedIdent => {
            let text = tok.text(src);
            let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
            (!inner.is_empty()).then(|| inner.to_string())
        }
        _ => None,
    }
}

/// A possibly schema-qualified name starting at `at`: `(name, tokens used)`.
pub fn qualified_name(toks: &[Token], src: &str, at: usize) -> Option<(String, usize)> {
    let first = toks.get(at)?;
    if first.kind == TokenKind::Word && is_keyword(&first.upper) {
        return None;
    }
    let mut name = ident_name(first, src)?;
    let mut used = 1;
    while toks.get(at + used).map(|t| t.kind) == Some(TokenKind::Dot) {
        match toks.get(at + used + 1).and_then(|t| ident_name(t, src)) {
            Some(part) => {
                name.push('.');
                name.push_str(&part);
                used += 2;
            }
            None => break,
        }
    }
    Some((name, used))
}

/// Tables referenced by the clause keyword at `at` (FROM, JOIN, UPDATE,
/// INTO, TABLE). Handles comma-separated FROM lists with aliases; skips
/// subqueries and table functions.
pub fn tables_after(toks: &[Token], src: &str, at: usize) -> Vec<String> {
    let Some(kw) = toks.get(at) else {
        return Vec::new();
    };
    let mut j = at + 1;
    if kw.is_word("TABLE") {
        // CREATE TABLE IF NOT EXISTS x / ALTER TABLE ONLY x
        while toks
            .get(j)
            .is_some_and(|t| t.is_any_word(&["IF", "NOT", "EXISTS", "ONLY"]))
        {
            j += 1;
        }
    }
    if kw.is_word("INTO") && !at.checked_sub(1).is_some_and(|p| toks[p].is_any_word(&["INSERT", "MERGE"])) {
        return Vec::new();
    }
    let mut tables = Vec::new();
    loop {
        let Some((name, used)) = qualified_name(toks, src, j) else {
            break;
        };
        if toks.get(j + used).map(|t| t.kind) == Some(TokenKind::LParen) && !kw.is_word("TABLE") && !kw.is_word("INTO") {
            break;
        }
        tables.push(name);
        j += used;
        if !kw.is_word("FROM") {
            break;
        }
        // Optional alias.
        if toks.get(j).is_some_and(|t| t.is_word("AS")) {
            j += 1;
        }
        if toks
            .get(j)
            .is_some_and(|t| t.kind == TokenKind::Word && !is_keyword(&t.upper))
        {
            j += 1;
        }
        if toks.get(j).map(|t| t.kind) != Some(TokenKind::Comma) {
            break;
        }
        j += 1;
    }
    tables
}

/// Whether the IF at `at` is a procedural IF: THEN appears before the
/// statement ends, at the same parenthesis depth.
pub fn is_procedural_if(toks: &[Token], at: usize) -> bool {
    let mut depth = 0i32;
    for tok in toks.iter().skip(at + 1) {
        match tok.kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            TokenKind::Semicolon | TokenKind::DollarQuote => return false,
            TokenKind::Word if depth == 0 && tok.upper == "THEN" => return true,
            _ => {}
        }
    }
    false
}

/// Index of the first statement terminator at or after `from`.
fn statement_end(toks: &[Token], from: usize) -> usize {
    toks.iter()
        .skip(from)
        .position(|t| t.kind == TokenKind::Semicolon || t.is_word("BEGIN"))
        .map_or(toks.len(), |p| p + from)
}

/// Header of `CREATE ... TRIGGER`.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerHeader {
    pub name: String,
    pub timing: Option<TriggerTiming>,
    pub table: Option<String>,
    /// `EXECUTE FUNCTION f()` / `EXECUTE PROCEDURE f()`.
    pub function: Option<String>,
}

/// Header of `CREATE FUNCTION|PROCEDURE`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineHeader {
    pub name: String,
    pub returns_trigger: bool,
}

/// Header of `CREATE PACKAGE [BODY] name IS|AS`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageHeader {
    pub name: String,
    /// The `IS`/`AS` token; the package block opens there.
    pub opens_at: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CreateHeader {
    Trigger(TriggerHeader),
    Routine(RoutineHeader),
    Package(PackageHeader),
    Table(String),
    Other,
}

/// Classify the `CREATE` statement at `at`.
pub fn create_header(toks: &[Token], src: &str, at: usize) -> CreateHeader {
    const MODIFIERS: &[&str] = &[
        "OR", "REPLACE", "CONSTRAINT", "TEMP", "TEMPORARY", "UNLOGGED", "GLOBAL", "LOCAL",
        "DEFINER", "EDITIONABLE", "NONEDITIONABLE",
    ];
    let mut j = at + 1;
    while let Some(tok) = toks.get(j) {
        if tok.is_any_word(MODIFIERS) {
            j += 1;
        } else if tok.kind == TokenKind::Operator && tok.text(src) == "=" {
            // DEFINER = user@host
            j += 2;
        } else {
            break;
        }
    }
    let Some(kind) = toks.get(j) else {
        return CreateHeader::Other;
    };
    let end = statement_end(toks, j);
    let window = &toks[j..end.max(j)];

    if kind.is_word("TRIGGER") {
        let name = qualified_name(toks, src, j + 1)
            .map(|(n, _)| n)
            .unwrap_or_else(|| "trigger".to_string());
        let mut header = TriggerHeader {
            name,
            timing: None,
            table: None,
            function: None,
        };
        for (k, tok) in window.iter().enumerate() {
            let abs = j + k;
            if header.timing.is_none() {
                header.timing = match tok.upper.as_str() {
                    "BEFORE" => Some(TriggerTiming::Before),
                    "AFTER" => Some(TriggerTiming::After),
                    "INSTEAD" => Some(TriggerTiming::InsteadOf),
                    _ => None,
                };
            }
            if header.table.is_none() && tok.is_word("ON") {
                header.table = qualified_name(toks, src, abs + 1).map(|(n, _)| n);
            }
            if tok.is_word("EXECUTE")
                && toks
                    .get(abs + 1)
                    .is_some_and(|t| t.is_any_word(&["FUNCTION", "PROCEDURE"]))
            {
                header.function = qualified_name(toks, src, abs + 2).map(|(n, _)| n);
            }
        }
        return CreateHeader::Trigger(header);
    }
    if kind.is_any_word(&["FUNCTION", "PROCEDURE"]) {
        let Some((name, _)) = qualified_name(toks, src, j + 1) else {
            return CreateHeader::Other;
        };
        let returns_trigger = toks
            .iter()
            .skip(j)
            .take_while(|t| {
                t.kind != TokenKind::DollarQuote
                    && t.kind != TokenKind::StringLit
                    && !t.is_any_word(&["BEGIN", "IS"])
                    && t.kind != TokenKind::Semicolon
            })
            .collect::<Vec<_>>()
            .windows(2)
            .any(|w| w[0].is_any_word(&["RETURNS", "RETURN"]) && w[1].is_word("TRIGGER"));
        return CreateHeader::Routine(RoutineHeader {
            name,
            returns_trigger,
        });
    }
    if kind.is_word("PACKAGE") {
        let at = if toks.get(j + 1).is_some_and(|t| t.is_word("BODY")) {
            j + 2
        } else {
            j + 1
        };
        let Some((name, used)) = qualified_name(toks, src, at) else {
            return CreateHeader::Other;
        };
        let opens_at = (at + used..end).find(|&k| toks[k].is_any_word(&["IS", "AS"]));
        return match opens_at {
            Some(opens_at) => CreateHeader::Package(PackageHeader { name, opens_at }),
            None => CreateHeader::Other,
        };
    }
    if kind.is_word("TABLE") {
        if let Some(name) = tables_after(toks, src, j).into_iter().next() {
            return CreateHeader::Table(name);
        }
    }
    CreateHeader::Other
}

/// Column name of the definition that contains the token at `at`: the
/// first token after the nearest enclosing `(` or `,` at the same depth.
pub fn column_name_before(toks: &[Token], src: &str, at: usize) -> Option<String> {
    let mut depth = 0i32;
    let mut k = at;
    while k > 0 {
        k -= 1;
        match toks[k].kind {
            TokenKind::RParen => depth += 1,
            TokenKind::LParen if depth > 0 => depth -= 1,
            TokenKind::LParen | TokenKind::Comma if depth == 0 => {
                let tok = toks.get(k + 1)?;
                if tok.kind == TokenKind::Word && (is_keyword(&tok.upper) || is_type_name(&tok.upper)) {
                    return None;
                }
                return ident_name(tok, src);
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::sql::lexer::tokenize;

    fn find(toks: &[Token], upper: &str) -> usize {
        toks.iter().position(|t| t.is_word(upper)).unwrap()
    }

    #[test]
    fn from_list_with_aliases() {
        let src = "SELECT * FROM orders o, public.Customers AS c WHERE o.id = c.id";
        let toks = tokenize(src);
        let tables = tables_after(&toks, src, find(&toks, "FROM"));
        assert_eq!(tables, vec!["orders", "public.customers"]);
    }

    #[test]
    fn select_into_variable_is_not_a_table() {
        let src = "SELECT total INTO v_total FROM orders";
        let toks = tokenize(src);
        assert!(tables_after(&toks, src, find(&toks, "INTO")).is_empty());
    }

    #[test]
    fn procedural_if_requires_then() {
        let src = "IF x > 1 THEN y := 1; END IF; DROP TABLE IF EXISTS t;";
        let toks = tokenize(src);
        assert!(is_procedural_if(&toks, 0));
        let ddl_if = toks.iter().rposition(|t| t.is_word("IF")).unwrap();
        assert!(!is_procedural_if(&toks, ddl_if));
    }

    #[test]
    fn trigger_header_fields() {
        let src = "CREATE OR REPLACE TRIGGER trg_qty BEFORE INSERT OR UPDATE ON orders \
                   FOR EACH ROW EXECUTE FUNCTION check_qty();";
        let toks = tokenize(src);
        match create_header(&toks, src, 0) {
            CreateHeader::Trigger(h) => {
                assert_eq!(h.name, "trg_qty");
                assert_eq!(h.timing, Some(TriggerTiming::Before));
                assert_eq!(h.table.as_deref(), Some("orders"));
                assert_eq!(h.function.as_deref(), Some("check_qty"));
            }
            other => panic!("expected trigger header, got {other:?}"),
        }
    }

    #[test]
    fn routine_returning_trigger() {
        let src = "CREATE FUNCTION check_qty() RETURNS trigger AS $$ BEGIN END; $$ LANGUAGE plpgsql;";
        let toks = tokenize(src);
        assert_eq!(
            create_header(&toks, src, 0),
            CreateHeader::Routine(RoutineHeader {
                name: "check_qty".into(),
                returns_trigger: true
            })
        );
    }

    #[test]
    fn package_body_opens_at_is() {
        let src = "CREATE OR REPLACE PACKAGE BODY billing.pkg AUTHID DEFINER IS PROCEDURE p IS BEGIN NULL; END p; END pkg;";
        let toks = tokenize(src);
        assert_eq!(
            create_header(&toks, src, 0),
            CreateHeader::Package(PackageHeader {
                name: "billing.pkg".into(),
                opens_at: find(&toks, "IS"),
            })
        );
    }

    #[test]
    fn generated_column_name() {
        let src = "CREATE TABLE t (price NUMERIC, total NUMERIC GENERATED ALWAYS AS (price * 2) STORED)";
        let toks = tokenize(src);
        assert_eq!(
            column_name_before(&toks, src, find(&toks, "GENERATED")).as_deref(),
            Some("total")
        );
    }
}
