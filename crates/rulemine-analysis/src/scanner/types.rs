//! Scanner data types: SourceFile, ScanStats, ScanOutcome.

use std::path::PathBuf;

use rulemine_core::errors::ScanError;
use rulemine_core::types::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use super::language_detect::Language;

/// A discovered source file, read into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Repository-relative path with `/` separators; what rules record.
    pub relative_path: String,
    pub language: Language,
    pub content: String,
    pub size: u64,
}

impl SourceFile {
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }
}

/// Aggregate statistics for a scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub total_size_bytes: u64,
    pub discovery_ms: u64,
    pub files_skipped_large: usize,
    pub files_skipped_binary: usize,
    pub files_skipped_encoding: usize,
    pub files_skipped_language: usize,
    pub languages_found: BTreeMap<Language, usize>,
}

/// Everything a scan produced. Per-file failures are non-fatal.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Sorted by relative path.
    pub files: Vec<SourceFile>,
    pub stats: ScanStats,
    pub errors: Vec<ScanError>,
}
