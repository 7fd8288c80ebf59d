//! Trace validation of freshly generated and stale documents.

use std::fs;

use rulemine_analysis::Pipeline;
use rulemine_core::config::{DmnConfig, RulemineConfig};
use rulemine_core::errors::ValidationError;
use rulemine_dmn::{DmnSerializer, FindingStatus, TraceValidator};
use tempfile::TempDir;

const PROC: &str = "CREATE FUNCTION fee(amount NUMERIC) RETURNS NUMERIC AS $$\nBEGIN\nIF amount > 100 THEN\n  RETURN 5;\nELSE\n  RETURN 1;\nEND IF;\nEND;\n$$ LANGUAGE plpgsql;\n";

fn repo_with_document() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("db")).unwrap();
    fs::write(dir.path().join("db/fee.sql"), PROC).unwrap();
    fs::write(
        dir.path().join("db/q.sql"),
        "SELECT * FROM invoices\nWHERE amount >= 0\n  AND status = 'open';\n",
    )
    .unwrap();
    let model = Pipeline::new(RulemineConfig::default())
        .unwrap()
        .run(dir.path())
        .unwrap()
        .data
        .model;
    assert!(model.rules.len() >= 4, "fixture rules: {}", model.rules.len());
    let doc = DmnSerializer::new(&DmnConfig::default()).serialize(&model).unwrap();
    (dir, doc)
}

/// A document generated from the tree validates cleanly against it.
#[test]
fn test_fresh_document_has_no_findings() {
    let (dir, doc) = repo_with_document();
    let report = TraceValidator::new(dir.path()).validate_document(&doc).unwrap();
    assert!(!report.findings.is_empty());
    assert!(report.is_clean(), "{}", report.render_markdown());
}

/// Editing a traced range after generation is detected.
#[test]
fn test_edited_source_is_a_mismatch() {
    let (dir, doc) = repo_with_document();
    fs::write(
        dir.path().join("db/fee.sql"),
        PROC.replace("amount > 100", "amount > 250"),
    )
    .unwrap();
    let report = TraceValidator::new(dir.path()).validate_document(&doc).unwrap();
    let failed = report.failed();
    assert!(!failed.is_empty());
    assert!(failed
        .iter()
        .all(|f| f.reference.file == "db/fee.sql" && f.status == FindingStatus::SnippetMismatch));
}

/// Deleted and shortened files are reported per reference.
#[test]
fn test_missing_and_truncated_files() {
    let (dir, doc) = repo_with_document();
    fs::remove_file(dir.path().join("db/q.sql")).unwrap();
    fs::write(dir.path().join("db/fee.sql"), "SELECT 1;\n").unwrap();
    let report = TraceValidator::new(dir.path()).validate_document(&doc).unwrap();
    assert!(report.passed().is_empty(), "{}", report.render_markdown());
    for finding in report.failed() {
        match finding.reference.file.as_str() {
            "db/q.sql" => assert_eq!(finding.status, FindingStatus::MissingFile),
            "db/fee.sql" => assert!(matches!(finding.status, FindingStatus::OutOfRange { line_count: 1 })),
            other => panic!("unexpected file {other}"),
        }
    }
}

/// Validation reads from disk and never modifies the document or tree.
#[test]
fn test_validate_file_is_read_only() {
    let (dir, doc) = repo_with_document();
    let out = dir.path().join("rules.dmn");
    fs::write(&out, &doc).unwrap();
    let report = TraceValidator::new(dir.path()).validate_file(&out).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.document.as_deref(), Some(out.display().to_string().as_str()));
    assert_eq!(fs::read_to_string(&out).unwrap(), doc);
    assert_eq!(fs::read_to_string(dir.path().join("db/fee.sql")).unwrap(), PROC);
}

/// The trace namespace bound in the document is honoured, so a stale
/// document written under another namespace is still checked.
#[test]
fn test_namespace_is_read_from_document() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("q.sql"), "SELECT * FROM t WHERE x > 1;\n").unwrap();
    let model = Pipeline::new(RulemineConfig::default())
        .unwrap()
        .run(dir.path())
        .unwrap()
        .data
        .model;
    let config = DmnConfig {
        namespace: Some("urn:custom:trace".to_string()),
        ..Default::default()
    };
    let doc = DmnSerializer::new(&config).serialize(&model).unwrap();

    let fresh = TraceValidator::new(dir.path()).validate_document(&doc).unwrap();
    assert_eq!(fresh.findings.len(), 1);
    assert!(fresh.is_clean(), "{}", fresh.render_markdown());

    fs::write(dir.path().join("q.sql"), "SELECT * FROM t WHERE x > 2;\n").unwrap();
    let stale = TraceValidator::new(dir.path()).validate_document(&doc).unwrap();
    assert!(!stale.is_clean(), "edited source must be detected");
    assert_eq!(stale.failed()[0].status, FindingStatus::SnippetMismatch);
}

/// Decisions with no traceability at all cannot be checked and fail.
#[test]
fn test_untraced_decisions_fail() {
    let dir = TempDir::new().unwrap();
    let doc = "<definitions xmlns=\"https://www.omg.org/spec/DMN/20191111/MODEL/\" id=\"d\">\
               <decision id=\"decision_group_1\" name=\"G\"/></definitions>";
    let report = TraceValidator::new(dir.path()).validate_document(doc).unwrap();
    assert_eq!(report.decisions, 1);
    assert!(report.findings.is_empty());
    assert!(!report.is_clean());
}

/// A missing document is an error, not an empty report.
#[test]
fn test_missing_document_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = TraceValidator::new(dir.path())
        .validate_file(&dir.path().join("nope.dmn"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::DocumentIo { .. }));
}

/// Paths escaping the root are flagged without being opened.
#[test]
fn test_escaping_paths_are_flagged() {
    let dir = TempDir::new().unwrap();
    let doc = format!(
        "<definitions xmlns:trace=\"{}\"><trace:source ruleId=\"r\" file=\"../secret.sql\" startLine=\"1\" endLine=\"1\"/></definitions>",
        DmnConfig::default().effective_namespace()
    );
    let report = TraceValidator::new(dir.path()).validate_document(&doc).unwrap();
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].status, FindingStatus::UnsafePath);
}
