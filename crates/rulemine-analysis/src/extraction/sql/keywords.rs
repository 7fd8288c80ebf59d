//! Reserved words that are never variables, columns or tables.

use once_cell::sync::Lazy;
use rulemine_core::types::collections::FxHashSet;

static KEYWORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "ALL", "ALTER", "ALWAYS", "AND", "ANY", "ARRAY", "AS", "ASC", "AFTER", "AT", "BEFORE",
        "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST", "CHECK", "COLUMN", "COMMIT",
        "CONSTRAINT", "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME",
        "CURRENT_TIMESTAMP", "CURRENT_USER", "DECLARE", "DEFAULT", "DELETE", "DESC", "DISTINCT",
        "DO", "EACH", "ELSE", "ELSEIF", "ELSIF", "END", "ESCAPE", "EXCEPT", "EXCEPTION", "EXECUTE",
        "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "FUNCTION", "GENERATED",
        "GROUP", "HAVING", "IF", "ILIKE", "IN", "INNER", "INSERT", "INSTEAD", "INTERSECT",
        "INTERVAL", "INTO", "IS", "JOIN", "KEY", "LANGUAGE", "LEFT", "LIKE", "LIMIT", "LOOP",
        "NOT", "NULL", "OF", "OFFSET", "OLD", "NEW", "ON", "OR", "ORDER", "OUTER", "PERFORM",
        "PRIMARY", "PROCEDURE", "RAISE", "REFERENCES", "REPLACE", "RETURN", "RETURNING",
        "RETURNS", "RIGHT", "ROW", "SELECT", "SET", "SIMILAR", "SOME", "STORED", "TABLE", "THEN",
        "TO", "TRIGGER", "TRUE", "UNION", "UNIQUE", "UNKNOWN", "UPDATE", "USING", "VALUES",
        "VIEW", "VIRTUAL", "WHEN", "WHERE", "WHILE", "WITH", "NOTICE", "SQLSTATE", "OTHERS",
        "MESSAGE", "USING", "ISNULL", "NOTNULL", "LATERAL", "OVER", "PARTITION", "WINDOW",
        "SYSDATE", "SYSTIMESTAMP", "NOW", "LOCALTIMESTAMP",
    ]
    .into_iter()
    .collect()
});

static TYPE_NAMES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "INT", "INTEGER", "SMALLINT", "BIGINT", "NUMERIC", "DECIMAL", "NUMBER", "REAL", "FLOAT",
        "DOUBLE", "PRECISION", "MONEY", "TEXT", "VARCHAR", "VARCHAR2", "NVARCHAR", "CHAR",
        "CHARACTER", "VARYING", "BOOLEAN", "BOOL", "BIT", "DATE", "TIME", "TIMESTAMP",
        "TIMESTAMPTZ", "ZONE", "JSON", "JSONB", "UUID", "BYTEA", "BLOB", "CLOB", "SERIAL",
        "BIGSERIAL", "RECORD",
    ]
    .into_iter()
    .collect()
});

/// Clause keywords that end an open WHERE/HAVING predicate at its depth.
pub const PREDICATE_TERMINATORS: &[&str] = &[
    "GROUP", "ORDER", "LIMIT", "OFFSET", "FETCH", "UNION", "INTERSECT", "EXCEPT", "RETURNING",
    "WINDOW", "HAVING", "LOOP", "THEN", "ELSE", "ELSIF", "ELSEIF", "END", "WHEN", "INTO", "FOR",
    "ON", "SET", "VALUES",
];

/// Words after `END` that belong to the terminator.
pub const END_QUALIFIERS: &[&str] = &["IF", "CASE", "LOOP", "WHILE", "REPEAT", "FOR", "TRY", "CATCH"];

/// Words after `BEGIN` that make it a transaction statement, not a block.
pub const TRANSACTION_WORDS: &[&str] = &["TRANSACTION", "TRAN", "WORK", "ISOLATION", "DEFERRED", "IMMEDIATE", "EXCLUSIVE"];

pub fn is_keyword(upper: &str) -> bool {
    KEYWORDS.contains(upper)
}

pub fn is_type_name(upper: &str) -> bool {
    TYPE_NAMES.contains(upper)
}
