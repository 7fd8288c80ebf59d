//! SQL tokenizer with line tracking.
//!
//! Dialect-tolerant: understands string literals, quoted identifiers,
//! dollar quoting, comments, bind placeholders and the usual operators.
//! Never fails; unknown bytes become `Other` tokens.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted identifier or keyword.
    Word,
    /// `"x"`, `` `x` `` or `[x]`.
    QuotedIdent,
    /// `'...'`, including `E'...'` / `N'...'` prefixes.
    StringLit,
    Number,
    /// Comparison, arithmetic, `:=`, `::`, `||` and friends.
    Operator,
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    /// `?`, `$1`, `:name`, `%s`, `%(name)s`, `{expr}`, `${expr}`.
    Placeholder,
    /// `$$` or `$tag$`; the body between two markers is lexed normally.
    DollarQuote,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range into the lexed text.
    pub start: usize,
    pub end: usize,
    /// 1-based line of the first byte.
    pub line: u32,
    /// 1-based line of the last byte.
    pub end_line: u32,
    /// Uppercased text for `Word` tokens, empty otherwise.
    pub upper: String,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    pub fn is_word(&self, upper: &str) -> bool {
        self.kind == TokenKind::Word && self.upper == upper
    }

    pub fn is_any_word(&self, uppers: &[&str]) -> bool {
        self.kind == TokenKind::Word && uppers.contains(&self.upper.as_str())
    }
}

/// Tokenize `source`. Comments and whitespace are dropped.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// Advance to `to`, counting newlines.
    fn advance_to(&mut self, to: usize) {
        let to = to.min(self.bytes.len());
        self.line += self.bytes[self.pos..to].iter().filter(|&&b| b == b'\n').count() as u32;
        self.pos = to;
    }

    fn push(&mut self, kind: TokenKind, start: usize, start_line: u32) {
        let end_line = start_line
            + self.bytes[start..self.pos]
                .iter()
                .filter(|&&b| b == b'\n')
                .count() as u32;
        let upper = if kind == TokenKind::Word {
            self.src[start..self.pos].to_ascii_uppercase()
        } else {
            String::new()
        };
        self.tokens.push(Token {
            kind,
            start,
            end: self.pos,
            line: start_line,
            end_line,
            upper,
        });
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            let start = self.pos;
            let line = self.line;

            if b == b'\n' {
                self.line += 1;
                self.pos += 1;
                continue;
            }
            if b.is_ascii_whitespace() {
                self.pos += 1;
                continue;
            }
            if b == b'-' && self.peek(1) == Some(b'-') {
                let end = self.find_from(self.pos, b"\n").unwrap_or(self.bytes.len());
                self.pos = end;
                continue;
            }
            if b == b'/' && self.peek(1) == Some(b'*') {
                let end = self
                    .find_from(self.pos + 2, b"*/")
                    .map(|i| i + 2)
                    .unwrap_or(self.bytes.len());
                self.advance_to(end);
                continue;
            }
            if b == b'\'' {
                self.skip_quoted(b'\'', b'\'', false);
                self.push(TokenKind::StringLit, start, line);
                continue;
            }
            if (b == b'E' || b == b'e' || b == b'N' || b == b'n') && self.peek(1) == Some(b'\'') {
                let backslash = b == b'E' || b == b'e';
                self.pos += 1;
                self.skip_quoted(b'\'', b'\'', backslash);
                self.push(TokenKind::StringLit, start, line);
                continue;
            }
            if b == b'"' {
                self.skip_quoted(b'"', b'"', false);
                self.push(TokenKind::QuotedIdent, start, line);
                continue;
            }
            if b == b'`' {
                self.skip_quoted(b'`', b'`', false);
                self.push(TokenKind::QuotedIdent, start, line);
                continue;
            }
            if b == b'[' {
                self.skip_quoted(b'[', b']', false);
                self.push(TokenKind::QuotedIdent, start, line);
                continue;
            }
            if b == b'$' {
                if let Some(len) = self.dollar_tag_len() {
                    self.pos += len;
                    self.push(TokenKind::DollarQuote, start, line);
                    continue;
                }
                if self.peek(1).is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                    self.take_while(|c| c.is_ascii_digit());
                    self.push(TokenKind::Placeholder, start, line);
                    continue;
                }
                if self.peek(1) == Some(b'{') {
                    self.pos += 1;
                    self.skip_braced();
                    self.push(TokenKind::Placeholder, start, line);
                    continue;
                }
            }
            if b == b'{' {
                self.skip_braced();
                self.push(TokenKind::Placeholder, start, line);
                continue;
            }
            if b == b'?' {
                self.pos += 1;
                self.push(TokenKind::Placeholder, start, line);
                continue;
            }
            if b == b':' && self.peek(1).is_some_and(is_ident_start) {
                self.pos += 1;
                self.take_while(is_ident_char);
                // Oracle trigger row references (`:NEW.col`) are not binds.
                let name = &self.src[start + 1..self.pos];
                if name.eq_ignore_ascii_case("new") || name.eq_ignore_ascii_case("old") {
                    self.push(TokenKind::Word, start + 1, line);
                } else {
                    self.push(TokenKind::Placeholder, start, line);
                }
                continue;
            }
            if b == b'%' && self.peek(1) == Some(b's') {
                self.pos += 2;
                self.push(TokenKind::Placeholder, start, line);
                continue;
            }
            if b == b'%' && self.peek(1) == Some(b'(') {
                if let Some(close) = self.find_from(self.pos, b")") {
                    if self.bytes.get(close + 1) == Some(&b's') {
                        self.advance_to(close + 2);
                        self.push(TokenKind::Placeholder, start, line);
                        continue;
                    }
                }
            }
            if b.is_ascii_digit() || (b == b'.' && self.peek(1).is_some_and(|c| c.is_ascii_digit())) {
                self.take_while(|c| c.is_ascii_digit() || c == b'.');
                if matches!(self.peek(0), Some(b'e') | Some(b'E'))
                    && self.peek(1).is_some_and(|c| c.is_ascii_digit())
                {
                    self.pos += 1;
                    self.take_while(|c| c.is_ascii_digit());
                }
                self.push(TokenKind::Number, start, line);
                continue;
            }
            if is_ident_start(b) || b >= 0x80 {
                self.take_while(|c| is_ident_char(c) || c >= 0x80);
                self.push(TokenKind::Word, start, line);
                continue;
            }
            let single = match b {
                b'(' => Some(TokenKind::LParen),
                b')' => Some(TokenKind::RParen),
                b',' => Some(TokenKind::Comma),
                b';' => Some(TokenKind::Semicolon),
                b'.' => Some(TokenKind::Dot),
                _ => None,
            };
            if let Some(kind) = single {
                self.pos += 1;
                self.push(kind, start, line);
                continue;
            }
            if let Some(len) = self.operator_len() {
                self.pos += len;
                self.push(TokenKind::Operator, start, line);
                continue;
            }
            // Keep multi-byte chars whole so slices stay on char boundaries.
            let ch_len = self.src[self.pos..].chars().next().map_or(1, char::len_utf8);
            self.pos += ch_len;
            self.push(TokenKind::Other, start, line);
        }
        self.tokens
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.pos < self.bytes.len() && pred(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn find_from(&self, from: usize, needle: &[u8]) -> Option<usize> {
        if from >= self.bytes.len() {
            return None;
        }
        self.bytes[from..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|i| i + from)
    }

    /// Skip a quoted run starting at `pos`; a doubled close char is an escape,
    /// and so is a backslash when `backslash` is set (`E'...'` strings).
    /// Unterminated quotes run to end of input.
    fn skip_quoted(&mut self, open: u8, close: u8, backslash: bool) {
        debug_assert_eq!(self.bytes[self.pos], open);
        let mut i = self.pos + 1;
        while i < self.bytes.len() {
            if self.bytes[i] == close {
                if open == close && self.bytes.get(i + 1) == Some(&close) {
                    i += 2;
                    continue;
                }
                self.advance_to(i + 1);
                return;
            }
            if backslash && self.bytes[i] == b'\\' {
                i += 2;
                continue;
            }
            i += 1;
        }
        self.advance_to(self.bytes.len());
    }

    fn skip_braced(&mut self) {
        let mut depth = 0usize;
        let mut i = self.pos;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance_to(i + 1);
                        return;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        self.advance_to(self.bytes.len());
    }

    /// Length of `$$` or `$tag$` at `pos`, if present.
    fn dollar_tag_len(&self) -> Option<usize> {
        let rest = &self.bytes[self.pos + 1..];
        if rest.first() == Some(&b'$') {
            return Some(2);
        }
        if !rest.first().copied().is_some_and(is_ident_start) {
            return None;
        }
        let tag_len = rest.iter().take_while(|&&c| is_ident_char(c)).count();
        (rest.get(tag_len) == Some(&b'$')).then_some(tag_len + 2)
    }

    fn operator_len(&self) -> Option<usize> {
        const OPS: &[&str] = &[
            "<=>", "===", "!==", "->>", "<>", "!=", "^=", "==", "<=", ">=", ":=", "::", "||", "&&",
            "=>", "->", "<", ">", "=", "+", "-", "*", "/", "%", "^", "!", "&", "|", "~", ":", "@",
            "#",
        ];
        let rest = &self.bytes[self.pos..];
        OPS.iter()
            .find(|op| rest.starts_with(op.as_bytes()))
            .map(|op| op.len())
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'@' || c == b'#'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c == b'@' || c == b'#'
}
