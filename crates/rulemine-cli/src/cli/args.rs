//! CLI argument definitions using clap
//!
//! Commands:
//! - rulemine analyze --repo <root> --format dmn|markdown|json|all --out <path> [--dry-run]
//! - rulemine validate --dmn <file> --repo <root>
//! - rulemine config --repo <root>
//!
//! `--config <path>` works with every command and replaces `<root>/rulemine.toml`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rulemine_core::config::CliOverrides;

/// rulemine - extract business rules from SQL and application code into DMN
#[derive(Parser, Debug)]
#[command(name = "rulemine")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log at debug level unless RULEMINE_LOG says otherwise
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Config file to use instead of <repo>/rulemine.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract rules from a repository and write the decision model
    Analyze {
        /// Repository root
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Dmn)]
        format: OutputFormat,

        /// Output file. With `--format all`, files named after its stem are
        /// written next to it. Without it, a single format goes to stdout.
        #[arg(long, short)]
        out: Option<PathBuf>,

        /// Print statistics only; write nothing
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Check a generated document's traceability against the source tree
    Validate {
        /// DMN document to check
        #[arg(long)]
        dmn: PathBuf,

        /// Repository root the document was generated from
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },

    /// Print the resolved configuration as TOML
    Config {
        /// Repository root whose rulemine.toml to include
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Dmn,
    Markdown,
    Json,
    All,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Dmn => "dmn",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::All => "all",
        }
    }
}

/// Highest-priority configuration layer.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Extraction worker threads (0 = one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Skip files larger than this many bytes
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Drop rules below this confidence
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Feature provider: hashing or ollama
    #[arg(long)]
    pub provider: Option<String>,

    /// Grouping method: kmeans, density, threshold or structural
    #[arg(long)]
    pub grouping: Option<String>,

    /// Target group count for kmeans
    #[arg(long)]
    pub groups: Option<usize>,
}

impl OverrideArgs {
    pub fn to_overrides(&self) -> CliOverrides {
        CliOverrides {
            scan_threads: self.threads,
            scan_max_file_size: self.max_file_size,
            min_confidence: self.min_confidence,
            enrichment_provider: self.provider.clone(),
            grouping_method: self.grouping.clone(),
            n_groups: self.groups,
            config_file: None,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::try_parse_from([
            "rulemine", "-v", "analyze", "--repo", "src", "--format", "all", "--out", "out/model.dmn",
            "--min-confidence", "0.5", "--grouping", "structural",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Analyze { repo, format, out, dry_run, overrides } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(repo, PathBuf::from("src"));
        assert_eq!(format, OutputFormat::All);
        assert_eq!(out, Some(PathBuf::from("out/model.dmn")));
        assert!(!dry_run);
        let o = overrides.to_overrides();
        assert_eq!(o.min_confidence, Some(0.5));
        assert_eq!(o.grouping_method.as_deref(), Some("structural"));
        assert_eq!(o.n_groups, None);
    }

    #[test]
    fn config_file_is_global() {
        let cli = Cli::try_parse_from(["rulemine", "validate", "--dmn", "a.dmn", "--config", "ci.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        let cli = Cli::try_parse_from(["rulemine", "--config", "ci.toml", "config"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("ci.toml")));
        assert!(matches!(cli.command, Command::Config { .. }));
    }

    #[test]
    fn validate_requires_document() {
        assert!(Cli::try_parse_from(["rulemine", "validate"]).is_err());
        assert!(Cli::try_parse_from(["rulemine", "validate", "--dmn", "a.dmn"]).is_ok());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["rulemine", "analyze", "--format", "svg"]).is_err());
    }
}
