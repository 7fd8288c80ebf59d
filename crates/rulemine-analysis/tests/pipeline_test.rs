//! End-to-end pipeline runs over small on-disk repositories.

use std::fs;
use std::path::Path;

use rulemine_analysis::Pipeline;
use rulemine_core::config::RulemineConfig;
use rulemine_core::errors::{PipelineError, ScanError};
use rulemine_core::model::RuleType;
use rulemine_core::traits::Cancellable;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn sample_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "db/schema.sql",
        "CREATE TABLE orders (\n  id SERIAL PRIMARY KEY,\n  total NUMERIC CHECK (total >= 0),\n  status TEXT\n);\n\
         SELECT * FROM orders WHERE status = 'open' AND total > 100;\n",
    );
    write(
        dir.path(),
        "app/pricing.py",
        "def price(order):\n    if order.total > 1000:\n        return order.total * 0.9\n    return order.total\n",
    );
    write(dir.path(), "README.md", "# not code\n");
    dir
}

/// An empty repository yields an empty but well-formed model.
#[test]
fn test_empty_repo_gives_empty_model() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(RulemineConfig::default()).unwrap();
    let result = pipeline.run(dir.path()).unwrap();
    assert!(result.is_clean());
    let model = &result.data.model;
    assert!(model.rules.is_empty());
    assert!(model.groups.is_empty());
    assert!(model.dependencies.is_empty());
    assert_eq!(model.metadata.files_scanned, 0);
}

/// A small mixed repo produces SQL and application rules, every rule is
/// grouped at most once, and group members reference valid indices.
#[test]
fn test_small_mixed_repo() {
    let dir = sample_repo();
    let pipeline = Pipeline::new(RulemineConfig::default()).unwrap();
    let result = pipeline.run(dir.path()).unwrap();
    assert!(result.is_clean(), "unexpected errors: {:?}", result.errors);

    let model = &result.data.model;
    assert_eq!(model.metadata.files_scanned, 2, "README is not a source file");
    let types: Vec<_> = model.rules.iter().map(|r| r.rule_type()).collect();
    assert!(types.contains(&RuleType::Constraint), "types: {types:?}");
    assert!(types.contains(&RuleType::Validation), "types: {types:?}");
    assert!(types.contains(&RuleType::Conditional), "types: {types:?}");
    assert!(model
        .rules
        .iter()
        .any(|r| r.source.file_path() == "app/pricing.py" && r.source.start_line() == 2));

    let mut seen = vec![false; model.rules.len()];
    for group in &model.groups {
        assert!(!group.rules.is_empty(), "{} is empty", group.id);
        for &idx in &group.rules {
            assert!(idx < model.rules.len(), "{} references {idx}", group.id);
            assert!(!seen[idx], "rule {idx} is in two groups");
            seen[idx] = true;
        }
    }
    for dep in &model.dependencies {
        assert!(dep.strength > 0.0 && dep.strength <= 1.0);
    }

    let stats = &result.data.stats;
    assert_eq!(stats.rules_extracted, model.rules.len() + stats.duplicates_removed);
    assert_eq!(stats.feature_provider.as_deref(), Some("hashing"));
}

/// Two runs over the same tree give the same ids, groups and dependencies.
#[test]
fn test_runs_are_deterministic() {
    let dir = sample_repo();
    let run = || {
        let pipeline = Pipeline::new(RulemineConfig::default()).unwrap();
        let model = pipeline.run(dir.path()).unwrap().data.model;
        let ids: Vec<_> = model.rules.iter().map(|r| r.id.clone()).collect();
        let groups: Vec<_> = model.groups.iter().map(|g| (g.id.clone(), g.rules.clone())).collect();
        let deps: Vec<_> = model
            .dependencies
            .iter()
            .map(|d| (d.source_group_id.clone(), d.target_group_id.clone(), d.kind))
            .collect();
        (ids, groups, deps)
    };
    assert_eq!(run(), run());
}

/// A run whose token is already cancelled stops without a model.
#[test]
fn test_cancelled_run_fails() {
    let dir = sample_repo();
    let pipeline = Pipeline::new(RulemineConfig::default()).unwrap();
    pipeline.cancellation().cancel();
    match pipeline.run(dir.path()) {
        Err(PipelineError::Cancelled) | Err(PipelineError::Scan(ScanError::Cancelled)) => {}
        other => panic!("expected cancellation, got {:?}", other.map(|r| r.data.model.rules.len())),
    }
}

/// A file that stops on an unmatched terminator is reported once; its
/// neighbours are analysed in full.
#[test]
fn test_broken_file_is_collected() {
    let dir = sample_repo();
    write(
        dir.path(),
        "db/broken.sql",
        "SELECT * FROM refunds WHERE amount > 0;\nEND LOOP;\nSELECT * FROM refunds WHERE reason IS NOT NULL;\n",
    );
    let pipeline = Pipeline::new(RulemineConfig::default()).unwrap();
    let result = pipeline.run(dir.path()).unwrap();

    assert_eq!(result.errors.len(), 1, "errors: {:?}", result.errors);
    let model = &result.data.model;
    assert_eq!(model.metadata.file_errors.len(), 1);
    assert!(model.metadata.file_errors[0].contains("broken.sql"), "{:?}", model.metadata.file_errors);

    let files: Vec<_> = model.rules.iter().map(|r| r.source.file_path()).collect();
    assert!(files.contains(&"app/pricing.py"), "files: {files:?}");
    assert!(files.contains(&"db/schema.sql"), "files: {files:?}");
    let broken: Vec<_> = model
        .rules
        .iter()
        .filter(|r| r.source.file_path() == "db/broken.sql")
        .collect();
    assert_eq!(broken.len(), 1, "only the rule before the mismatch survives");
    assert_eq!(broken[0].source.start_line(), 1);
}

/// Rules come out in file-list order however many workers extract them.
#[test]
fn test_rule_order_is_independent_of_threads() {
    let dir = TempDir::new().unwrap();
    let mut expected = Vec::new();
    for i in 0..12 {
        let rel = format!("sql/q{i:02}.sql");
        write(
            dir.path(),
            &rel,
            &format!("SELECT * FROM t{i} WHERE c{i} > {i};\n"),
        );
        expected.push(rel);
    }
    let run = |threads: usize| {
        let mut config = RulemineConfig::default();
        config.scan.threads = Some(threads);
        let pipeline = Pipeline::new(config).unwrap();
        let model = pipeline.run(dir.path()).unwrap().data.model;
        model
            .rules
            .iter()
            .map(|r| (r.source.file_path().to_string(), r.id.clone()))
            .collect::<Vec<_>>()
    };

    let parallel = run(4);
    let files: Vec<_> = parallel.iter().map(|(f, _)| f.clone()).collect();
    assert_eq!(files, expected);
    assert_eq!(parallel, run(1));
}

/// An invalid configuration is rejected before any work starts.
#[test]
fn test_invalid_config_is_fatal() {
    let mut config = RulemineConfig::default();
    config.extraction.min_confidence = Some(1.5);
    assert!(Pipeline::new(config).is_err());
}

/// A missing root is a fatal scan error.
#[test]
fn test_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(RulemineConfig::default()).unwrap();
    assert!(pipeline.run(&dir.path().join("nope")).is_err());
}
