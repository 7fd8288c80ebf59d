//! Run statistics, printed by `analyze --dry-run`.

use rulemine_core::model::{DecisionModel, DependencyKind, RuleType};
use rulemine_core::types::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::scanner::ScanStats;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub scan: ScanStats,
    pub rules_extracted: usize,
    pub duplicates_removed: usize,
    pub rules_filtered: usize,
    pub rules_by_type: BTreeMap<RuleType, usize>,
    pub groups: usize,
    pub dependencies_by_kind: BTreeMap<DependencyKind, usize>,
    pub file_errors: usize,
    pub feature_provider: Option<String>,
    pub feature_fallback: bool,
    pub elapsed_ms: u64,
}

impl RunStats {
    /// Fill the counts that the finished model can answer.
    pub fn record_model(&mut self, model: &DecisionModel) {
        self.rules_by_type = model.rules_by_type();
        self.groups = model.groups.len();
        self.dependencies_by_kind = model.dependencies_by_kind();
    }

    /// Plain-text summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "files scanned: {} ({} bytes)\n",
            self.scan.total_files, self.scan.total_size_bytes
        ));
        out.push_str(&format!(
            "files skipped: {} large, {} binary, {} encoding, {} unsupported\n",
            self.scan.files_skipped_large,
            self.scan.files_skipped_binary,
            self.scan.files_skipped_encoding,
            self.scan.files_skipped_language
        ));
        out.push_str(&format!(
            "rules: {} extracted, {} duplicates removed, {} below confidence\n",
            self.rules_extracted, self.duplicates_removed, self.rules_filtered
        ));
        for (rule_type, count) in &self.rules_by_type {
            out.push_str(&format!("  {rule_type}: {count}\n"));
        }
        out.push_str(&format!("groups: {}\n", self.groups));
        let deps: usize = self.dependencies_by_kind.values().sum();
        out.push_str(&format!("dependencies: {deps}\n"));
        for (kind, count) in &self.dependencies_by_kind {
            out.push_str(&format!("  {kind}: {count}\n"));
        }
        if let Some(ref provider) = self.feature_provider {
            let note = if self.feature_fallback { " (fallback)" } else { "" };
            out.push_str(&format!("features: {provider}{note}\n"));
        }
        out.push_str(&format!("file errors: {}\n", self.file_errors));
        out.push_str(&format!("elapsed: {} ms\n", self.elapsed_ms));
        out
    }
}
