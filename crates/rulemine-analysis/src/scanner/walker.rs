//! File discovery over `ignore::WalkBuilder`, with parallel reads via rayon.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use ignore::WalkBuilder;
use rayon::prelude::*;
use rulemine_core::config::ScanConfig;
use rulemine_core::errors::ScanError;
use rulemine_core::traits::{Cancellable, CancellationToken};
use rulemine_core::types::collections::BTreeSet;

use super::ignores::{IgnorePatterns, RULEMINE_IGNORE_FILE};
use super::language_detect::Language;
use super::types::{ScanOutcome, ScanStats, SourceFile};

/// How many leading bytes are inspected for NUL when sniffing binaries.
const BINARY_SNIFF_BYTES: usize = 8_000;

/// Walks a repository and loads every supported source file.
pub struct Scanner {
    config: ScanConfig,
    languages: Option<BTreeSet<Language>>,
}

enum ReadOutcome {
    File(SourceFile),
    TooLarge,
    Binary,
    Failed(ScanError),
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let languages: BTreeSet<Language> = config
            .languages
            .iter()
            .filter_map(|name| {
                let lang = Language::from_name(name);
                if lang.is_none() {
                    tracing::warn!(language = %name, "unknown language in scan.languages");
                }
                lang
            })
            .collect();
        Self {
            config,
            languages: if languages.is_empty() { None } else { Some(languages) },
        }
    }

    /// Discover and read files under `root`, sorted by relative path.
    ///
    /// Unreadable files become entries in `ScanOutcome::errors`; only an
    /// invalid root or cancellation fail the whole scan.
    pub fn scan(&self, root: &Path, cancel: &CancellationToken) -> Result<ScanOutcome, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::InvalidRoot {
                path: root.to_path_buf(),
            });
        }
        let start = Instant::now();
        let mut stats = ScanStats::default();
        let mut errors = Vec::new();

        let candidates = self.discover(root, cancel, &mut stats, &mut errors)?;
        let max_size = self.config.effective_max_file_size();

        let outcomes: Vec<ReadOutcome> = candidates
            .par_iter()
            .map(|(path, language)| read_source(root, path, *language, max_size))
            .collect();

        if cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        let mut files = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                ReadOutcome::File(file) => {
                    stats.total_size_bytes += file.size;
                    *stats.languages_found.entry(file.language).or_insert(0) += 1;
                    files.push(file);
                }
                ReadOutcome::TooLarge => stats.files_skipped_large += 1,
                ReadOutcome::Binary => stats.files_skipped_binary += 1,
                ReadOutcome::Failed(e) => {
                    if matches!(e, ScanError::UnsupportedEncoding { .. }) {
                        stats.files_skipped_encoding += 1;
                    }
                    errors.push(e);
                }
            }
        }
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        stats.total_files = files.len();
        stats.discovery_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            files = stats.total_files,
            errors = errors.len(),
            ms = stats.discovery_ms,
            "scan complete"
        );
        Ok(ScanOutcome {
            files,
            stats,
            errors,
        })
    }

    /// Single-threaded walk; deterministic order.
    fn discover(
        &self,
        root: &Path,
        cancel: &CancellationToken,
        stats: &mut ScanStats,
        errors: &mut Vec<ScanError>,
    ) -> Result<Vec<(PathBuf, Language)>, ScanError> {
        let ignores = Arc::new(IgnorePatterns::new(root, &self.config.extra_ignore));
        let filter_root = root.to_path_buf();

        let walker = WalkBuilder::new(root)
            .hidden(true)
            .git_ignore(true)
            .git_exclude(true)
            .require_git(false)
            .add_custom_ignore_filename(RULEMINE_IGNORE_FILE)
            .follow_links(self.config.effective_follow_symlinks())
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let rel = entry.path().strip_prefix(&filter_root).unwrap_or(entry.path());
                if rel.as_os_str().is_empty() {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !ignores.is_ignored(rel, is_dir)
            })
            .build();

        let mut candidates = Vec::new();
        for entry in walker {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    errors.push(ScanError::WalkError {
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            let Some(language) = Language::from_extension(path.extension().and_then(|e| e.to_str()))
            else {
                continue;
            };
            if let Some(ref allowed) = self.languages {
                if !allowed.contains(&language) {
                    stats.files_skipped_language += 1;
                    continue;
                }
            }
            candidates.push((path, language));
        }
        Ok(candidates)
    }
}

fn read_source(root: &Path, path: &Path, language: Language, max_size: u64) -> ReadOutcome {
    let size = match fs::metadata(path) {
        Ok(m) => m.len(),
        Err(source) => {
            return ReadOutcome::Failed(ScanError::IoError {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if size > max_size {
        tracing::debug!(path = %path.display(), size, max_size, "skipping large file");
        return ReadOutcome::TooLarge;
    }
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(source) => {
            return ReadOutcome::Failed(ScanError::IoError {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if bytes.iter().take(BINARY_SNIFF_BYTES).any(|&b| b == 0) {
        return ReadOutcome::Binary;
    }
    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(_) => {
            return ReadOutcome::Failed(ScanError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "non-UTF-8".to_string(),
            })
        }
    };
    ReadOutcome::File(SourceFile {
        relative_path: relative_path(root, path),
        path: path.to_path_buf(),
        language,
        content,
        size,
    })
}

/// Root-relative path with `/` separators regardless of platform.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
