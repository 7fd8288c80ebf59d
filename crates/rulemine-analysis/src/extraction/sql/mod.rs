//! SQL rule extraction: a tolerant lexer and a single-pass frame-stack
//! scanner over its tokens.

mod clauses;
mod draft;
mod engine;
mod frames;
mod keywords;
mod lexer;

pub use draft::collapse_whitespace;
pub use engine::extract_sql;
pub use frames::ScanState;
pub use lexer::{tokenize, Token, TokenKind};
