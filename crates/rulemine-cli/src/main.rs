//! rulemine CLI entry point.
//!
//! Parses arguments and dispatches through `cli::run`. Exit status: 0 on
//! success, 1 when validation finds stale references, 2 on any error.

mod cli;

use std::process::ExitCode;

use cli::CliErrorCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("{e}");
            if *e.code() == CliErrorCode::UsageError {
                eprintln!("Run `rulemine --help` for usage.");
            }
            ExitCode::from(2)
        }
    }
}
