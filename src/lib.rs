// src/lib.rs

pub mod cli;
pub mod config;
pub mod directive;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::BufReader;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_raw_or_default, ConfigFile};
use crate::engine::{Controller, RunOptions};
use crate::errors::Result;
use crate::exec::ShellExecutor;
use crate::fs::RealFileSystem;
use crate::report::color::should_colorize;
use crate::report::Reporter;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the real file system and shell executor
/// - the run controller, reporting to stdout and prompting on stdin
///
/// Returns the process exit status.
pub async fn run(args: CliArgs) -> Result<i32> {
    let mut raw = load_raw_or_default(args.config.as_deref())?;
    args.apply_to(&mut raw);
    let config = ConfigFile::try_from(raw)?;
    debug!(?config, "configuration loaded");

    let root: PathBuf = std::env::current_dir().context("resolving current directory")?;
    let fail_on_test_failure = config.fail_on_test_failure;

    let options = RunOptions {
        root: root.clone(),
        verbose: args.verbose,
        watch: args.watch,
    };
    let executor = Arc::new(ShellExecutor::new().with_working_dir(root));
    let controller = Controller::new(config, options, Arc::new(RealFileSystem), executor);

    let mut reporter = Reporter::new(std::io::stdout(), args.verbose).with_color(should_colorize());
    let mut input = BufReader::new(tokio::io::stdin());

    let exit = controller.run(&mut reporter, &mut input).await?;
    Ok(exit.exit_code(fail_on_test_failure))
}
