// src/logging.rs

//! Diagnostics for `taskdag`.
//!
//! `show`, `check` and `connect` print their results on stdout. Everything
//! logged here (skipped records, unresolved references, cycles) goes to
//! stderr, so `taskdag show > levels.txt` captures only the listing.
//!
//! `--log-level` sets a single level for every target. Without it,
//! `TASKDAG_LOG` is read as an `EnvFilter` directive string, so both
//! `TASKDAG_LOG=debug` and `TASKDAG_LOG=taskdag::dag::resolver=debug,warn`
//! work. An unset or unparsable value means `info`.

use anyhow::{Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "TASKDAG_LOG";

/// Install the stderr subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let filter = log_filter(cli_level, env_value.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// Filter for the given flag and `TASKDAG_LOG` value; the flag wins.
pub fn log_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::default().add_directive(level_filter(level).into());
    }

    env_value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}
