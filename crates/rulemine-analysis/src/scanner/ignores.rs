//! Default ignore patterns applied on top of `.gitignore` / `.rulemineignore`.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Directories that never hold hand-written business logic.
pub const DEFAULT_IGNORE_DIRS: &[&str] = &[
    // Package managers
    "node_modules",
    ".pnpm",
    ".yarn",
    "bower_components",
    // Python
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    "site-packages",
    "*.egg-info",
    // JVM
    "target",
    ".gradle",
    ".m2",
    // Version control
    ".git",
    ".svn",
    ".hg",
    // IDE/Editor
    ".idea",
    ".vscode",
    // Build outputs
    "dist",
    "build",
    "out",
    // Coverage/Caches
    "coverage",
    ".nyc_output",
    ".cache",
    ".next",
    // Our own output
    ".rulemine",
];

/// Generated or minified files.
pub const DEFAULT_IGNORE_FILES: &[&str] = &[
    "*.min.js",
    "*.map",
    "*.pyc",
    "*.class",
    "*.generated.*",
    "*.d.ts",
];

/// Name of the project-specific ignore file.
pub const RULEMINE_IGNORE_FILE: &str = ".rulemineignore";

/// Compiled default + configured ignore patterns.
pub struct IgnorePatterns {
    gitignore: Gitignore,
}

impl IgnorePatterns {
    /// Build from the defaults plus `extra_patterns` (gitignore syntax).
    /// Invalid patterns are logged and skipped.
    pub fn new(root: &Path, extra_patterns: &[String]) -> Self {
        let mut builder = GitignoreBuilder::new(root);
        let defaults = DEFAULT_IGNORE_DIRS.iter().chain(DEFAULT_IGNORE_FILES);
        for pattern in defaults.copied().chain(extra_patterns.iter().map(String::as_str)) {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!(pattern, error = %e, "skipping invalid ignore pattern");
            }
        }

        let gitignore = match builder.build() {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!(error = %e, "ignore patterns failed to compile, using none");
                Gitignore::empty()
            }
        };
        Self { gitignore }
    }

    /// Check a root-relative path.
    pub fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        self.gitignore.matched(relative, is_dir).is_ignore()
    }
}
