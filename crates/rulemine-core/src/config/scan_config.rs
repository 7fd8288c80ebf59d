//! Scan configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_FILE_SIZE, DEFAULT_THREADS};

/// Configuration for the file enumerator and extraction worker pool.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Maximum file size in bytes. Default: 10MB.
    pub max_file_size: Option<u64>,
    /// Worker threads for extraction. 0 = auto-detect. Default: 0.
    pub threads: Option<usize>,
    /// Additional ignore patterns (gitignore syntax).
    #[serde(default)]
    pub extra_ignore: Vec<String>,
    /// Whether to follow symbolic links. Default: false.
    pub follow_symlinks: Option<bool>,
    /// Restrict extraction to these languages (by name). Empty = all.
    #[serde(default)]
    pub languages: Vec<String>,
}

impl ScanConfig {
    pub fn effective_max_file_size(&self) -> u64 {
        self.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or(DEFAULT_THREADS)
    }

    pub fn effective_follow_symlinks(&self) -> bool {
        self.follow_symlinks.unwrap_or(false)
    }
}
