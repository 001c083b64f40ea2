// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawConfigFile;
use crate::types::DirectiveMode;

/// Command-line arguments for `run-tests`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "run-tests",
    version,
    about = "Runs the RUN: directives embedded in test sources.",
    long_about = None
)]
pub struct CliArgs {
    /// Print every build/clean command, and the commands run for each file.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only run sources whose path matches this regex (anchored at the start).
    #[arg(short, long, value_name = "REGEX")]
    pub filter: Option<String>,

    /// Skip sources whose path matches this regex (anchored at the start).
    #[arg(short, long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// After each run, wait for Enter and run everything again.
    #[arg(short, long)]
    pub watch: bool,

    /// Path to the config file (TOML).
    ///
    /// Default: `RunTests.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-process timeout, e.g. `10s`, `500ms`.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Run the directives of each file one after another instead of
    /// concurrently.
    #[arg(long)]
    pub sequential: bool,

    /// Exit with status 1 when any test fails.
    #[arg(long)]
    pub fail_on_test_failure: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNTESTS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

impl CliArgs {
    /// Overlay the flags that were given on top of the file configuration.
    pub fn apply_to(&self, raw: &mut RawConfigFile) {
        if let Some(filter) = &self.filter {
            raw.discover.include = filter.clone();
        }
        if let Some(exclude) = &self.exclude {
            raw.discover.exclude = Some(exclude.clone());
        }
        if let Some(timeout) = &self.timeout {
            raw.run.timeout = timeout.clone();
        }
        if self.sequential {
            raw.run.directive_mode = DirectiveMode::Sequential;
        }
        if self.fail_on_test_failure {
            raw.run.fail_on_test_failure = true;
        }
    }
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
