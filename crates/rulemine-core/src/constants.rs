//! Shared constants for the rulemine extraction engine.

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generator name recorded in every output artifact.
pub const GENERATOR_NAME: &str = "rulemine";

/// Maximum file size in bytes for scanning (default: 10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1_048_576;

/// Default number of extraction threads (0 = auto-detect).
pub const DEFAULT_THREADS: usize = 0;

/// Default snippet cap, in characters.
pub const DEFAULT_SNIPPET_MAX_CHARS: usize = 500;

/// Default minimum rule confidence kept after extraction.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.0;

/// Default SQL dialect label.
pub const DEFAULT_SQL_DIALECT: &str = "postgres";

/// Default feature provider.
pub const DEFAULT_FEATURE_PROVIDER: &str = "hashing";

/// Default feature vector dimensionality.
pub const DEFAULT_FEATURE_DIMENSIONS: usize = 128;

/// Default per-call timeout for feature providers, in milliseconds.
pub const DEFAULT_ENRICHMENT_TIMEOUT_MS: u64 = 5_000;

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default Ollama embedding model.
pub const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

/// Default grouping method.
pub const DEFAULT_GROUPING_METHOD: &str = "kmeans";

/// Default target group count for k-means.
pub const DEFAULT_GROUP_COUNT: usize = 5;

/// Smallest cluster the density method will form.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

/// Default cosine similarity threshold for linkage grouping.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Default seed for deterministic grouping.
pub const DEFAULT_GROUPING_SEED: u64 = 42;

/// Default minimum dependency strength.
pub const DEFAULT_MIN_DEPENDENCY_STRENGTH: f64 = 0.1;

/// DMN 1.3 model namespace.
pub const DMN_NAMESPACE: &str = "https://www.omg.org/spec/DMN/20191111/MODEL/";

/// Default traceability extension namespace.
pub const DEFAULT_TRACE_NAMESPACE: &str = "http://rulemine.dev/dmn/trace";

/// Default `definitions` name attribute.
pub const DEFAULT_DEFINITIONS_NAME: &str = "Extracted Business Rules";

/// Placeholder output entry for rows whose action could not be extracted.
pub const MANUAL_COMPLETION_PLACEHOLDER: &str = "<manual>";

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "rulemine.toml";

/// User-level config directory name under `$HOME`.
pub const USER_CONFIG_DIR: &str = ".rulemine";

/// Environment variable read by `init_tracing`.
pub const LOG_ENV_VAR: &str = "RULEMINE_LOG";
