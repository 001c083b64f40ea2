// src/exec/orchestrator.rs

//! Fans test sources and their directives out over the executor backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::directive::{extract_directives, ResolvedCommand, TokenSubstitutor};
use crate::exec::ExecutorBackend;
use crate::fs::FileSystem;
use crate::report::{Execution, FileResult, TestSource};
use crate::types::DirectiveMode;

/// Runs every directive of every source and collects one [`FileResult`] per
/// source.
///
/// All sources run concurrently. Within a source, directives run
/// concurrently or in file order depending on [`DirectiveMode`]; either way
/// the executions come back in directive order and every directive runs.
#[derive(Clone)]
pub struct Orchestrator {
    executor: Arc<dyn ExecutorBackend>,
    substitutor: TokenSubstitutor,
    timeout: Duration,
    mode: DirectiveMode,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("substitutor", &self.substitutor)
            .field("timeout", &self.timeout)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        executor: Arc<dyn ExecutorBackend>,
        substitutor: TokenSubstitutor,
        timeout: Duration,
        mode: DirectiveMode,
    ) -> Self {
        Self {
            executor,
            substitutor,
            timeout,
            mode,
        }
    }

    /// Load and run every source in `paths` (relative to `root`).
    ///
    /// Returns one result per path, in the order of `paths`, once every
    /// source has finished. A source that cannot be read fails on its own.
    pub async fn run_paths(
        &self,
        fs: Arc<dyn FileSystem>,
        root: &Path,
        paths: &[String],
    ) -> Vec<FileResult> {
        let mut join_set = JoinSet::new();
        for (idx, path) in paths.iter().cloned().enumerate() {
            let this = self.clone();
            let fs = Arc::clone(&fs);
            let full_path: PathBuf = root.join(&path);
            join_set.spawn(async move {
                let result = match fs.read_to_string(&full_path) {
                    Ok(content) => this.run_source(TestSource { path, content }).await,
                    Err(err) => {
                        warn!(source = %path, error = %err, "cannot read test source");
                        FileResult::errored(path, format!("{err:#}"))
                    }
                };
                (idx, result)
            });
        }

        let mut slots: Vec<Option<FileResult>> = vec![None; paths.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(e) => warn!(error = %e, "source runner task failed"),
            }
        }

        paths
            .iter()
            .zip(slots)
            .map(|(path, slot)| {
                slot.unwrap_or_else(|| FileResult::errored(path.clone(), "runner task did not complete"))
            })
            .collect()
    }

    /// Extract, substitute and execute the directives of one source.
    pub async fn run_source(&self, source: TestSource) -> FileResult {
        let directives = extract_directives(&source.content);
        let commands = self
            .substitutor
            .resolve_all(&directives, Path::new(&source.path));

        if commands.is_empty() {
            debug!(source = %source.path, "no directives");
            return FileResult::new(source.path, Vec::new());
        }

        info!(
            source = %source.path,
            directives = commands.len(),
            mode = ?self.mode,
            "running source"
        );

        let executions = match self.mode {
            DirectiveMode::Concurrent => self.run_concurrent(commands).await,
            DirectiveMode::Sequential => self.run_sequential(commands).await,
        };

        FileResult::new(source.path, executions)
    }

    async fn run_concurrent(&self, commands: Vec<ResolvedCommand>) -> Vec<Execution> {
        let started_at = Instant::now();
        let mut join_set = JoinSet::new();
        for (idx, command) in commands.iter().cloned().enumerate() {
            let fut = self.executor.execute(command, Some(self.timeout));
            join_set.spawn(async move { (idx, fut.await) });
        }

        let mut slots: Vec<Option<Execution>> = vec![None; commands.len()];
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((idx, execution)) => slots[idx] = Some(execution),
                Err(e) => warn!(error = %e, "directive task failed"),
            }
        }

        commands
            .into_iter()
            .zip(slots)
            .map(|(command, slot)| {
                slot.unwrap_or_else(|| {
                    Execution::failed_to_run(command, started_at, "directive task did not complete")
                })
            })
            .collect()
    }

    async fn run_sequential(&self, commands: Vec<ResolvedCommand>) -> Vec<Execution> {
        let mut executions = Vec::with_capacity(commands.len());
        for command in commands {
            executions.push(self.executor.execute(command, Some(self.timeout)).await);
        }
        executions
    }
}
