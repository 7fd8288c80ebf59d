//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Initialize the rulemine tracing/logging system.
///
/// Reads the `RULEMINE_LOG` environment variable for per-module log levels.
/// Format: `RULEMINE_LOG=rulemine_analysis=debug,rulemine_dmn=warn`
///
/// Falls back to `rulemine=info` if `RULEMINE_LOG` is not set or is invalid.
///
/// Idempotent: calling it multiple times is safe.
pub fn init_tracing() {
    init_tracing_with_default("rulemine=info");
}

/// Like [`init_tracing`], with a caller-chosen fallback directive.
/// The CLI uses this to honour `--verbose`.
pub fn init_tracing_with_default(default_directive: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
