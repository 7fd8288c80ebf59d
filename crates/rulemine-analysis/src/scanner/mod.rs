//! Scanner subsystem: file discovery, ignore handling, language detection.

pub mod ignores;
pub mod language_detect;
pub mod types;
pub mod walker;

pub use language_detect::Language;
pub use types::{ScanOutcome, ScanStats, SourceFile};
pub use walker::Scanner;
