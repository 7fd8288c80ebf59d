//! Top-level rulemine configuration with 4-layer resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    DependencyConfig, DmnConfig, EnrichmentConfig, ExtractionConfig, GroupingConfig, ScanConfig,
};
use crate::constants::{DMN_NAMESPACE, PROJECT_CONFIG_FILE, USER_CONFIG_DIR};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`RULEMINE_*`)
/// 3. Project config (`rulemine.toml` in project root, or `--config <path>`)
/// 4. User config (`~/.rulemine/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RulemineConfig {
    pub scan: ScanConfig,
    pub extraction: ExtractionConfig,
    pub enrichment: EnrichmentConfig,
    pub grouping: GroupingConfig,
    pub dependencies: DependencyConfig,
    pub dmn: DmnConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_threads: Option<usize>,
    pub scan_max_file_size: Option<u64>,
    pub min_confidence: Option<f64>,
    pub enrichment_provider: Option<String>,
    pub grouping_method: Option<String>,
    pub n_groups: Option<usize>,
    /// Read this file as the project layer instead of `<root>/rulemine.toml`.
    pub config_file: Option<PathBuf>,
}

impl RulemineConfig {
    /// Load configuration with 4-layer resolution and validate the result.
    ///
    /// A malformed project or user file is fatal; a missing one is not.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Layer 4 (lowest priority): user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                Self::merge_toml_file(&mut config, &user_config_path)?;
            }
        }

        // Layer 3: project config. A file named explicitly must exist.
        match cli_overrides.and_then(|c| c.config_file.as_deref()) {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::merge_toml_file(&mut config, path)?;
            }
            None => {
                let project_config_path = root.join(PROJECT_CONFIG_FILE);
                if project_config_path.exists() {
                    Self::merge_toml_file(&mut config, &project_config_path)?;
                }
            }
        }

        // Layer 2: environment variables
        Self::apply_env_overrides(&mut config)?;

        // Layer 1 (highest priority): CLI flags
        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (no layering, no validation).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &RulemineConfig) -> Result<(), ConfigError> {
        if let Some(max_file_size) = config.scan.max_file_size {
            if max_file_size == 0 {
                return Err(invalid("scan.max_file_size", "must be greater than 0"));
            }
        }
        check_unit_range("extraction.min_confidence", config.extraction.min_confidence)?;
        if config.extraction.snippet_max_chars == Some(0) {
            return Err(invalid(
                "extraction.snippet_max_chars",
                "must be greater than 0",
            ));
        }
        if config.enrichment.dimensions == Some(0) {
            return Err(invalid("enrichment.dimensions", "must be greater than 0"));
        }
        if config.enrichment.timeout_ms == Some(0) {
            return Err(invalid("enrichment.timeout_ms", "must be greater than 0"));
        }
        if config.grouping.n_groups == Some(0) {
            return Err(invalid("grouping.n_groups", "must be greater than 0"));
        }
        if matches!(config.grouping.min_cluster_size, Some(n) if n < 2) {
            return Err(invalid("grouping.min_cluster_size", "must be at least 2"));
        }
        check_unit_range(
            "grouping.similarity_threshold",
            config.grouping.similarity_threshold,
        )?;
        check_unit_range(
            "dependencies.min_strength",
            config.dependencies.min_strength,
        )?;
        if config.dmn.snippet_max_chars == Some(0) {
            return Err(invalid("dmn.snippet_max_chars", "must be greater than 0"));
        }
        if let Some(ref ns) = config.dmn.namespace {
            if ns.trim().is_empty() {
                return Err(invalid("dmn.namespace", "must not be empty"));
            }
            if ns == DMN_NAMESPACE {
                return Err(invalid(
                    "dmn.namespace",
                    "must differ from the DMN model namespace",
                ));
            }
        }
        Ok(())
    }

    /// Returns the user config path: `~/.rulemine/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut RulemineConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: RulemineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        ::tracing::debug!(path = %path.display(), "merged config file");
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut RulemineConfig, other: &RulemineConfig) {
        // Scan
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }
        if !other.scan.extra_ignore.is_empty() {
            base.scan.extra_ignore = other.scan.extra_ignore.clone();
        }
        if other.scan.follow_symlinks.is_some() {
            base.scan.follow_symlinks = other.scan.follow_symlinks;
        }
        if !other.scan.languages.is_empty() {
            base.scan.languages = other.scan.languages.clone();
        }

        // Extraction
        if other.extraction.snippet_max_chars.is_some() {
            base.extraction.snippet_max_chars = other.extraction.snippet_max_chars;
        }
        if other.extraction.min_confidence.is_some() {
            base.extraction.min_confidence = other.extraction.min_confidence;
        }
        if other.extraction.sql_dialect.is_some() {
            base.extraction.sql_dialect = other.extraction.sql_dialect.clone();
        }
        if other.extraction.app_code.is_some() {
            base.extraction.app_code = other.extraction.app_code;
        }

        // Enrichment
        if other.enrichment.enabled.is_some() {
            base.enrichment.enabled = other.enrichment.enabled;
        }
        if other.enrichment.provider.is_some() {
            base.enrichment.provider = other.enrichment.provider.clone();
        }
        if other.enrichment.dimensions.is_some() {
            base.enrichment.dimensions = other.enrichment.dimensions;
        }
        if other.enrichment.timeout_ms.is_some() {
            base.enrichment.timeout_ms = other.enrichment.timeout_ms;
        }
        if other.enrichment.ollama_url.is_some() {
            base.enrichment.ollama_url = other.enrichment.ollama_url.clone();
        }
        if other.enrichment.ollama_model.is_some() {
            base.enrichment.ollama_model = other.enrichment.ollama_model.clone();
        }
        if other.enrichment.domain_mapping.is_some() {
            base.enrichment.domain_mapping = other.enrichment.domain_mapping;
        }

        // Grouping
        if other.grouping.method.is_some() {
            base.grouping.method = other.grouping.method.clone();
        }
        if other.grouping.n_groups.is_some() {
            base.grouping.n_groups = other.grouping.n_groups;
        }
        if other.grouping.similarity_threshold.is_some() {
            base.grouping.similarity_threshold = other.grouping.similarity_threshold;
        }
        if other.grouping.min_cluster_size.is_some() {
            base.grouping.min_cluster_size = other.grouping.min_cluster_size;
        }
        if other.grouping.seed.is_some() {
            base.grouping.seed = other.grouping.seed;
        }

        // Dependencies
        if other.dependencies.min_strength.is_some() {
            base.dependencies.min_strength = other.dependencies.min_strength;
        }
        if other.dependencies.temporal.is_some() {
            base.dependencies.temporal = other.dependencies.temporal;
        }

        // DMN
        if other.dmn.namespace.is_some() {
            base.dmn.namespace = other.dmn.namespace.clone();
        }
        if other.dmn.definitions_name.is_some() {
            base.dmn.definitions_name = other.dmn.definitions_name.clone();
        }
        if other.dmn.exporter.is_some() {
            base.dmn.exporter = other.dmn.exporter.clone();
        }
        if other.dmn.snippet_max_chars.is_some() {
            base.dmn.snippet_max_chars = other.dmn.snippet_max_chars;
        }
        if other.dmn.include_snippets.is_some() {
            base.dmn.include_snippets = other.dmn.include_snippets;
        }
        if other.dmn.pretty_print.is_some() {
            base.dmn.pretty_print = other.dmn.pretty_print;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `RULEMINE_SCAN_THREADS`, `RULEMINE_EXTRACTION_MIN_CONFIDENCE`, etc.
    ///
    /// A set variable that does not parse is a configuration error rather
    /// than a silent no-op.
    fn apply_env_overrides(config: &mut RulemineConfig) -> Result<(), ConfigError> {
        if let Some(v) = env_parse::<u64>("RULEMINE_SCAN_MAX_FILE_SIZE")? {
            config.scan.max_file_size = Some(v);
        }
        if let Some(v) = env_parse::<usize>("RULEMINE_SCAN_THREADS")? {
            config.scan.threads = Some(v);
        }
        if let Some(v) = env_parse::<f64>("RULEMINE_EXTRACTION_MIN_CONFIDENCE")? {
            config.extraction.min_confidence = Some(v);
        }
        if let Some(v) = env_parse::<usize>("RULEMINE_EXTRACTION_SNIPPET_MAX_CHARS")? {
            config.extraction.snippet_max_chars = Some(v);
        }
        if let Ok(val) = std::env::var("RULEMINE_ENRICHMENT_PROVIDER") {
            config.enrichment.provider = Some(val);
        }
        if let Some(v) = env_parse::<u64>("RULEMINE_ENRICHMENT_TIMEOUT_MS")? {
            config.enrichment.timeout_ms = Some(v);
        }
        if let Ok(val) = std::env::var("RULEMINE_ENRICHMENT_OLLAMA_URL") {
            config.enrichment.ollama_url = Some(val);
        }
        if let Ok(val) = std::env::var("RULEMINE_GROUPING_METHOD") {
            config.grouping.method = Some(val);
        }
        if let Some(v) = env_parse::<usize>("RULEMINE_GROUPING_N_GROUPS")? {
            config.grouping.n_groups = Some(v);
        }
        if let Some(v) = env_parse::<f64>("RULEMINE_DEPENDENCIES_MIN_STRENGTH")? {
            config.dependencies.min_strength = Some(v);
        }
        if let Ok(val) = std::env::var("RULEMINE_DMN_NAMESPACE") {
            config.dmn.namespace = Some(val);
        }
        Ok(())
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(config: &mut RulemineConfig, cli: &CliOverrides) {
        if let Some(v) = cli.scan_threads {
            config.scan.threads = Some(v);
        }
        if let Some(v) = cli.scan_max_file_size {
            config.scan.max_file_size = Some(v);
        }
        if let Some(v) = cli.min_confidence {
            config.extraction.min_confidence = Some(v);
        }
        if let Some(ref v) = cli.enrichment_provider {
            config.enrichment.provider = Some(v.clone());
        }
        if let Some(ref v) = cli.grouping_method {
            config.grouping.method = Some(v.clone());
        }
        if let Some(v) = cli.n_groups {
            config.grouping.n_groups = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn check_unit_range(field: &str, value: Option<f64>) -> Result<(), ConfigError> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(invalid(field, "must be between 0.0 and 1.0")),
        _ => Ok(()),
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                field: key.to_string(),
                message: format!("cannot parse {val:?}"),
            }),
        Err(_) => Ok(None),
    }
}

/// Returns the user-level config directory: `~/.rulemine/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(USER_CONFIG_DIR))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = RulemineConfig::default();
        assert!(RulemineConfig::validate(&config).is_ok());
        assert_eq!(config.extraction.effective_snippet_max_chars(), 500);
        assert_eq!(config.grouping.effective_method(), "kmeans");
        assert!((config.dependencies.effective_min_strength() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn merge_only_overrides_set_fields() {
        let mut base = RulemineConfig::from_toml("[grouping]\nn_groups = 3\nseed = 7\n").unwrap();
        let other = RulemineConfig::from_toml("[grouping]\nn_groups = 9\n").unwrap();
        RulemineConfig::merge(&mut base, &other);
        assert_eq!(base.grouping.n_groups, Some(9));
        assert_eq!(base.grouping.seed, Some(7), "unset field must survive merge");
    }

    #[test]
    fn trace_namespace_must_not_shadow_dmn() {
        let mut config = RulemineConfig::default();
        config.dmn.namespace = Some(DMN_NAMESPACE.to_string());
        assert!(matches!(
            RulemineConfig::validate(&config),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }
}
