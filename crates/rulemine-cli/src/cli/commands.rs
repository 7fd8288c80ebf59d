//! CLI command implementations

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rulemine_analysis::{AnalysisOutput, Pipeline};
use rulemine_core::config::{CliOverrides, RulemineConfig};
use rulemine_core::tracing::init_tracing_with_default;
use rulemine_dmn::{expand_formats, render_all, Rendered, TraceValidator};

use super::args::{Cli, Command, OutputFormat};
use super::errors::{CliError, CliResult};

/// How a successful command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Validation ran but some references no longer match the source.
    Findings,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Findings => ExitCode::from(1),
        }
    }
}

/// Parse arguments, set up logging, and run the chosen command.
pub fn run() -> CliResult<Outcome> {
    let cli = Cli::parse_args();
    init_tracing_with_default(if cli.verbose { "rulemine=debug" } else { "rulemine=info" });
    run_command(cli.command, cli.config.as_deref())
}

/// Run the appropriate command based on CLI args. `config_file` replaces
/// the repository's `rulemine.toml` when given.
pub fn run_command(cmd: Command, config_file: Option<&Path>) -> CliResult<Outcome> {
    match cmd {
        Command::Analyze {
            repo,
            format,
            out,
            dry_run,
            overrides,
        } => {
            let mut overrides = overrides.to_overrides();
            overrides.config_file = config_file.map(Path::to_path_buf);
            analyze(&repo, format, out.as_deref(), dry_run, &overrides)
        }
        Command::Validate { dmn, repo } => validate(&dmn, &repo, &file_only(config_file)),
        Command::Config { repo } => config(&repo, &file_only(config_file)),
    }
}

fn file_only(config_file: Option<&Path>) -> CliOverrides {
    CliOverrides {
        config_file: config_file.map(Path::to_path_buf),
        ..Default::default()
    }
}

/// Extract, group and render. With `dry_run`, only statistics are printed.
pub fn analyze(
    repo: &Path,
    format: OutputFormat,
    out: Option<&Path>,
    dry_run: bool,
    overrides: &CliOverrides,
) -> CliResult<Outcome> {
    if format == OutputFormat::All && out.is_none() && !dry_run {
        return Err(CliError::usage("--format all needs --out to name the output files"));
    }
    let config = RulemineConfig::load(repo, Some(overrides))?;
    let pipeline = Pipeline::new(config)?;
    let result = pipeline.run(repo)?;
    for e in &result.errors {
        tracing::warn!(error = %e, "file not fully analysed");
    }
    let AnalysisOutput { model, stats } = result.data;

    if dry_run {
        print!("{}", stats.render());
        return Ok(Outcome::Success);
    }

    let formats = expand_formats(format.as_str());
    let rendered = render_all(&model, &formats, &pipeline.config().dmn);
    let mut failed = Vec::new();
    for item in rendered {
        let Rendered {
            format: name,
            extension,
            output,
        } = item;
        let text = match output {
            Ok(text) => text,
            Err(e) => {
                failed.push(format!("{name}: {e}"));
                continue;
            }
        };
        match out {
            None => io::stdout().write_all(text.as_bytes())?,
            Some(path) => {
                let target = output_path(path, extension, format == OutputFormat::All);
                write_output(&target, &text)?;
                tracing::info!(format = %name, path = %target.display(), "output written");
            }
        }
    }
    if out.is_some() {
        eprint!("{}", stats.render());
    }

    if failed.is_empty() {
        Ok(Outcome::Success)
    } else {
        Err(CliError::serialization_failed(failed.join("; ")))
    }
}

/// Re-check every traceability reference in `dmn` against `repo`.
pub fn validate(dmn: &Path, repo: &Path, overrides: &CliOverrides) -> CliResult<Outcome> {
    let config = RulemineConfig::load(repo, Some(overrides))?;
    let report = TraceValidator::new(repo)
        .with_namespace(config.dmn.effective_namespace())
        .validate_file(dmn)?;
    print!("{}", report.render_markdown());
    Ok(if report.is_clean() {
        Outcome::Success
    } else {
        Outcome::Findings
    })
}

/// Print the fully resolved configuration.
pub fn config(repo: &Path, overrides: &CliOverrides) -> CliResult<Outcome> {
    let config = RulemineConfig::load(repo, Some(overrides))?;
    print!("{}", config.to_toml()?);
    Ok(Outcome::Success)
}

/// For `all`, every format lands next to `out` as `<stem>.<ext>`; a single
/// format is written to `out` exactly.
fn output_path(out: &Path, extension: &str, all: bool) -> PathBuf {
    if all {
        out.with_extension(extension)
    } else {
        out.to_path_buf()
    }
}

fn write_output(path: &Path, text: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| CliError::io_error(format!("{}: {e}", parent.display())))?;
    }
    fs::write(path, text).map_err(|e| CliError::io_error(format!("{}: {e}", path.display())))
}
