// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Build and edit a dependency graph from per-task JSON records.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project config file (TOML).
    ///
    /// Default: `Taskdag.toml` in the current working directory; a missing
    /// default file means built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the task records. Overrides `[paths].tasks`.
    #[arg(long, value_name = "DIR")]
    pub tasks_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every task grouped by level.
    Show,

    /// Report unresolved references, skipped records and cycles.
    ///
    /// Exits non-zero when the graph contains a cycle.
    Check,

    /// Make CHILD depend on PARENT and save it to CHILD's record.
    Connect {
        /// Key of the task to depend on.
        parent: String,
        /// Key of the task gaining the dependency.
        child: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
