// src/logging.rs

//! Diagnostics for `luatask` via `tracing` + `tracing-subscriber`.
//!
//! The filter is picked in this order:
//! 1. `--log-level`: applies to the `luatask` target only;
//! 2. `LUATASK_LOG`: full `EnvFilter` directives, e.g. `debug` or
//!    `luatask::script=trace,luatask::exec=info`;
//! 3. `luatask=warn`.
//!
//! Output goes to stderr; stdout belongs to the tasks.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "LUATASK_LOG";

const DEFAULT_DIRECTIVES: &str = "luatask=warn";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))?;

    Ok(())
}

/// Filter for the given CLI level and `LUATASK_LOG` value.
///
/// A blank environment value counts as unset. Malformed directives are an
/// error rather than being silently dropped.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(format!("luatask={}", directive_level(level))));
    }

    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} value {directives:?}")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

fn directive_level(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
