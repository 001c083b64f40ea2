// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The orchestrator and the run controller talk to an `ExecutorBackend`
//! instead of spawning processes directly. This makes it easy to swap in a
//! fake executor in tests while keeping the production implementation in
//! [`process`](super::process).
//!
//! - `ShellExecutor` is the default implementation used by `run-tests`. It
//!   runs each command through `sh -c` (or `cmd /C`).
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which commands were requested and returns canned executions.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use crate::directive::ResolvedCommand;
use crate::report::Execution;

use super::process::{run_shell, ProcessOptions};

/// Boxed, owned future returned by [`ExecutorBackend::execute`].
pub type ExecutionFuture = Pin<Box<dyn Future<Output = Execution> + Send + 'static>>;

/// Trait abstracting how resolved commands are executed.
///
/// The returned future owns everything it needs, so callers can move it into
/// a spawned task.
pub trait ExecutorBackend: Send + Sync {
    /// Run one command to completion, or until `timeout` elapses.
    ///
    /// Implementations never fail: problems are reported through the
    /// returned [`Execution`].
    fn execute(&self, command: ResolvedCommand, timeout: Option<Duration>) -> ExecutionFuture;
}

/// Real executor backend used in production.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    options: ProcessOptions,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.working_dir = Some(dir.into());
        self
    }
}

impl ExecutorBackend for ShellExecutor {
    fn execute(&self, command: ResolvedCommand, timeout: Option<Duration>) -> ExecutionFuture {
        // Clone the options so the future doesn't borrow `self`.
        let options = self.options.clone();
        Box::pin(async move { run_shell(command, timeout, &options).await })
    }
}
