//! Pipeline driver: scan → extract → normalize → enrich → group →
//! dependencies → [`DecisionModel`].

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use rulemine_core::config::RulemineConfig;
use rulemine_core::errors::{ConfigError, ParseError, PipelineError, PipelineResult};
use rulemine_core::model::{DecisionModel, Rule};
use rulemine_core::traits::{Cancellable, CancellationToken};

use super::stats::RunStats;
use crate::dependencies::infer_dependencies;
use crate::enrichment::{create_feature_provider, Enricher, FeatureProvider};
use crate::extraction::{extract_file, FileExtraction};
use crate::grouping::{create_grouping_provider, group_rules, GroupingProvider};
use crate::normalize::{deduplicate_rules, filter_by_confidence, normalize_rules};
use crate::scanner::{Scanner, SourceFile};

#[derive(Debug, Default)]
pub struct AnalysisOutput {
    pub model: DecisionModel,
    pub stats: RunStats,
}

pub struct Pipeline {
    config: RulemineConfig,
    cancel: CancellationToken,
    feature_provider: Option<Arc<dyn FeatureProvider>>,
    grouping_provider: Option<Box<dyn GroupingProvider>>,
}

impl Pipeline {
    /// Validates the configuration up front; an invalid one is fatal.
    pub fn new(config: RulemineConfig) -> Result<Self, ConfigError> {
        RulemineConfig::validate(&config)?;
        Ok(Self {
            config,
            cancel: CancellationToken::new(),
            feature_provider: None,
            grouping_provider: None,
        })
    }

    /// Replace the configured feature provider.
    pub fn with_feature_provider(mut self, provider: Arc<dyn FeatureProvider>) -> Self {
        self.feature_provider = Some(provider);
        self
    }

    /// Replace the configured grouping provider.
    pub fn with_grouping_provider(mut self, provider: Box<dyn GroupingProvider>) -> Self {
        self.grouping_provider = Some(provider);
        self
    }

    /// Handle for aborting a run from another thread.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &RulemineConfig {
        &self.config
    }

    /// Analyse the repository at `root`. File-level failures are collected
    /// in the result; only an invalid root or cancellation fail the run.
    pub fn run(&self, root: &Path) -> Result<PipelineResult<AnalysisOutput>, PipelineError> {
        let start = Instant::now();
        let scanner = Scanner::new(self.config.scan.clone());
        let outcome = scanner.scan(root, &self.cancel)?;
        let mut result = PipelineResult::new(AnalysisOutput::default());
        let mut file_errors: Vec<String> = Vec::new();
        for e in outcome.errors {
            file_errors.push(e.to_string());
            result.add_error(e.into());
        }

        let (rules, parse_errors) = self.extract_files(&outcome.files)?;
        for e in parse_errors {
            file_errors.push(e.to_string());
            result.add_error(e.into());
        }

        let mut stats = RunStats {
            scan: outcome.stats,
            file_errors: file_errors.len(),
            ..Default::default()
        };
        let mut model = self.build_model(rules, &mut stats);
        model.metadata.files_scanned = stats.scan.total_files;
        model.metadata.rules_filtered = stats.rules_filtered;
        model.metadata.file_errors = file_errors;
        stats.elapsed_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            rules = model.rules.len(),
            groups = model.groups.len(),
            dependencies = model.dependencies.len(),
            errors = result.error_count(),
            ms = stats.elapsed_ms,
            "analysis complete"
        );
        result.data = AnalysisOutput { model, stats };
        Ok(result)
    }

    /// Extract every file on a bounded pool. Results keep file-list order
    /// whatever order workers finish in. Cancellation is checked between
    /// files.
    pub fn extract_files(
        &self,
        files: &[SourceFile],
    ) -> Result<(Vec<Rule>, Vec<ParseError>), PipelineError> {
        let extraction = &self.config.extraction;
        let cancel = &self.cancel;
        let work = || -> Vec<Option<FileExtraction>> {
            files
                .par_iter()
                .map(|file| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    tracing::debug!(file = %file.relative_path, language = %file.language, "extracting");
                    Some(extract_file(file, extraction))
                })
                .collect()
        };

        let threads = self.config.scan.effective_threads();
        let results = if threads > 0 {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(work),
                Err(e) => {
                    tracing::warn!(error = %e, threads, "thread pool setup failed, using global pool");
                    work()
                }
            }
        } else {
            work()
        };

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let mut rules = Vec::new();
        let mut errors = Vec::new();
        for extraction in results.into_iter().flatten() {
            rules.extend(extraction.rules);
            errors.extend(extraction.errors);
        }
        Ok((rules, errors))
    }

    /// Everything after extraction. Single-threaded.
    pub fn build_model(&self, rules: Vec<Rule>, stats: &mut RunStats) -> DecisionModel {
        stats.rules_extracted = rules.len();
        let rules = normalize_rules(rules);
        let deduped = deduplicate_rules(rules);
        stats.duplicates_removed = stats.rules_extracted - deduped.len();
        let (mut rules, removed) =
            filter_by_confidence(deduped, self.config.extraction.effective_min_confidence());
        stats.rules_filtered = removed;

        if self.config.enrichment.effective_enabled() {
            let provider = match self.feature_provider {
                Some(ref p) => Arc::clone(p),
                None => Arc::from(create_feature_provider(&self.config.enrichment)),
            };
            let report = Enricher::new(provider, &self.config.enrichment).enrich(&mut rules);
            stats.feature_provider = Some(report.provider);
            stats.feature_fallback = report.fell_back;
        }

        let groups = match self.grouping_provider {
            Some(ref p) => group_rules(&rules, p.as_ref()),
            None => match create_grouping_provider(&self.config.grouping) {
                Ok(p) => group_rules(&rules, p.as_ref()),
                Err(e) => {
                    tracing::warn!(error = %e, "grouping provider rejected, using structural");
                    group_rules(&rules, &crate::grouping::StructuralGrouping)
                }
            },
        };
        let dependencies = infer_dependencies(&groups, &rules, &self.config.dependencies);

        let model = DecisionModel::new(rules, groups, dependencies);
        stats.record_model(&model);
        model
    }
}
