//! Trace validation findings and their Markdown report.

use std::fmt::{self, Write};

use crate::validator::TraceReference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingStatus {
    Pass,
    /// Absolute or escaping the repository root; never opened.
    UnsafePath,
    MissingFile,
    OutOfRange { line_count: u32 },
    SnippetMismatch,
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingStatus::Pass => f.write_str("ok"),
            FindingStatus::UnsafePath => f.write_str("path is absolute or leaves the repository"),
            FindingStatus::MissingFile => f.write_str("file not found"),
            FindingStatus::OutOfRange { line_count } => {
                write!(f, "line range outside file ({line_count} lines)")
            }
            FindingStatus::SnippetMismatch => f.write_str("snippet differs from source"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Finding {
    pub reference: TraceReference,
    pub status: FindingStatus,
}

impl Finding {
    pub fn passed(&self) -> bool {
        self.status == FindingStatus::Pass
    }
}

/// Per-reference results for one document. A document whose decisions
/// carry no traceability references at all cannot be checked and is
/// reported as a failure; an empty document is clean.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub document: Option<String>,
    pub decisions: usize,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn passed(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.passed()).collect()
    }

    pub fn failed(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| !f.passed()).collect()
    }

    /// Decisions exist but none of them could be traced.
    pub fn untraced(&self) -> bool {
        self.decisions > 0 && self.findings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.untraced() && self.findings.iter().all(Finding::passed)
    }

    pub fn render_markdown(&self) -> String {
        let mut md = String::from("# Trace Validation Report\n\n");
        if let Some(ref document) = self.document {
            let _ = writeln!(md, "- **Document:** {document}");
        }
        let failed = self.failed();
        let _ = writeln!(md, "- **Decisions:** {}", self.decisions);
        let _ = writeln!(md, "- **References checked:** {}", self.findings.len());
        let _ = writeln!(md, "- **Passed:** {}", self.findings.len() - failed.len());
        let _ = writeln!(md, "- **Failed:** {}\n", failed.len());

        if self.untraced() {
            md.push_str("## Failures\n\nNo traceability sources found. The document's trace namespace may not match.\n");
            return md;
        }
        if failed.is_empty() {
            md.push_str("All traceability references match the source tree.\n");
            return md;
        }
        md.push_str("## Failures\n\n| Rule | Location | Problem |\n|---|---|---|\n");
        for finding in failed {
            let r = &finding.reference;
            let _ = writeln!(
                md,
                "| `{}` | {}#L{}-L{} | {} |",
                r.rule_id, r.file, r.start_line, r.end_line, finding.status
            );
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(status: FindingStatus) -> Finding {
        Finding {
            reference: TraceReference {
                rule_id: "rule_0000000000000001".to_string(),
                file: "a.sql".to_string(),
                start_line: 3,
                end_line: 4,
                snippet: None,
            },
            status,
        }
    }

    #[test]
    fn empty_report_is_clean() {
        let report = ValidationReport::default();
        assert!(report.is_clean());
        assert!(report.render_markdown().contains("All traceability references match"));
    }

    #[test]
    fn failures_are_tabulated() {
        let report = ValidationReport {
            document: Some("out.dmn".to_string()),
            decisions: 1,
            findings: vec![
                finding(FindingStatus::Pass),
                finding(FindingStatus::OutOfRange { line_count: 2 }),
            ],
        };
        assert!(!report.is_clean());
        assert_eq!(report.passed().len(), 1);
        let md = report.render_markdown();
        assert!(md.contains("- **Failed:** 1"));
        assert!(md.contains("| `rule_0000000000000001` | a.sql#L3-L4 | line range outside file (2 lines) |"));
    }

    #[test]
    fn decisions_without_references_fail() {
        let report = ValidationReport {
            document: None,
            decisions: 2,
            findings: Vec::new(),
        };
        assert!(report.untraced());
        assert!(!report.is_clean());
        assert!(report.render_markdown().contains("No traceability sources found"));
    }
}
