//! Language detection from file extension.

use serde::{Deserialize, Serialize};

/// Languages the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Language {
    Sql,
    Python,
    Java,
    JavaScript,
    TypeScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::Sql,
        Language::Python,
        Language::Java,
        Language::JavaScript,
        Language::TypeScript,
    ];

    /// Detect language from a file extension string (case-insensitive).
    pub fn from_extension(ext: Option<&str>) -> Option<Language> {
        let ext = ext?.to_ascii_lowercase();
        match ext.as_str() {
            "sql" | "pgsql" | "plsql" | "psql" | "ddl" | "tsql" | "mysql" | "pks" | "pkb"
            | "trg" => Some(Language::Sql),
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Parse a configured language name (`scan.languages`).
    pub fn from_name(name: &str) -> Option<Language> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sql" => Some(Language::Sql),
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "javascript" | "js" => Some(Language::JavaScript),
            "typescript" | "ts" => Some(Language::TypeScript),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Sql => "sql",
            Language::Python => "python",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
        }
    }

    /// Whether the file is application code (SQL lives in its literals).
    pub fn is_application_code(&self) -> bool {
        !matches!(self, Language::Sql)
    }

    /// Tree-sitter grammar for application languages; `None` for SQL,
    /// which has its own lexer.
    pub fn ts_language(&self) -> Option<tree_sitter::Language> {
        match self {
            Language::Sql => None,
            Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
            Language::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        }
    }

    /// Like [`Language::ts_language`], with TSX handling for `.tsx` files.
    pub fn ts_language_for_ext(&self, ext: Option<&str>) -> Option<tree_sitter::Language> {
        if matches!(self, Language::TypeScript) && ext == Some("tsx") {
            Some(tree_sitter_typescript::LANGUAGE_TSX.into())
        } else {
            self.ts_language()
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
