// src/engine/controller.rs

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::directive::{ResolvedCommand, TokenSubstitutor};
use crate::discover::discover_sources;
use crate::errors::{Result, RunTestsError};
use crate::exec::{ExecutorBackend, Orchestrator};
use crate::fs::FileSystem;
use crate::report::{FileResult, Reporter, RunSummary};

use super::state::{PhaseEvent, RunPhase, SetupStep};

/// Settings that come from the command line rather than the config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory that is searched for sources and that commands run in.
    pub root: PathBuf,
    pub verbose: bool,
    pub watch: bool,
}

/// How a single build-clean-run-report cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(RunSummary),
    Aborted(SetupStep),
}

/// How the whole invocation ended (after the last watch cycle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunExit {
    SetupFailed(SetupStep),
    Finished(RunSummary),
}

impl RunExit {
    /// Process exit status. Test failures only count when
    /// `fail_on_test_failure` is set.
    pub fn exit_code(&self, fail_on_test_failure: bool) -> i32 {
        match self {
            RunExit::SetupFailed(_) => 1,
            RunExit::Finished(summary) if fail_on_test_failure && !summary.all_passed() => 1,
            RunExit::Finished(_) => 0,
        }
    }
}

/// Drives the run lifecycle: build, temp-dir reset, discovery, directive
/// execution and reporting, optionally repeated in watch mode.
///
/// The phase transitions live in [`RunPhase`]; this type performs the IO for
/// each phase.
pub struct Controller {
    config: ConfigFile,
    options: RunOptions,
    fs: Arc<dyn FileSystem>,
    executor: Arc<dyn ExecutorBackend>,
    orchestrator: Orchestrator,
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Controller {
    pub fn new(
        config: ConfigFile,
        options: RunOptions,
        fs: Arc<dyn FileSystem>,
        executor: Arc<dyn ExecutorBackend>,
    ) -> Self {
        let temp_dir = options.root.join(&config.temp_dir);
        let substitutor = TokenSubstitutor::new(
            &temp_dir,
            config.tool_alias.clone(),
            config.tool_invocation.clone(),
        );
        let orchestrator = Orchestrator::new(
            Arc::clone(&executor),
            substitutor,
            config.timeout,
            config.directive_mode,
        );
        Self {
            config,
            options,
            fs,
            executor,
            orchestrator,
        }
    }

    /// Absolute (or root-relative) temp directory substituted for `%t`.
    pub fn temp_dir(&self) -> PathBuf {
        self.options.root.join(&self.config.temp_dir)
    }

    /// Run cycles until the run stops.
    ///
    /// In watch mode the controller prompts on `reporter` after every
    /// completed cycle and waits for a line on `input`; end of input stops
    /// the loop. A setup failure always stops immediately.
    pub async fn run<W, R>(&self, reporter: &mut Reporter<W>, input: &mut R) -> Result<RunExit>
    where
        W: Write,
        R: AsyncBufRead + Unpin,
    {
        loop {
            let summary = match self.run_once(reporter).await? {
                PassOutcome::Aborted(step) => return Ok(RunExit::SetupFailed(step)),
                PassOutcome::Completed(summary) => summary,
            };

            let event = if self.options.watch && wait_for_rerun(reporter, input).await? {
                PhaseEvent::Rerun
            } else {
                PhaseEvent::Stop
            };

            if transition(RunPhase::Reporting, event)?.is_terminal() {
                return Ok(RunExit::Finished(summary));
            }
            info!("rerunning");
        }
    }

    /// One build-clean-run-report cycle.
    pub async fn run_once<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<PassOutcome> {
        let mut phase = transition(RunPhase::Idle, PhaseEvent::Start)?;
        let mut results: Vec<FileResult> = Vec::new();
        let mut started = Instant::now();

        loop {
            phase = match phase {
                RunPhase::Building => {
                    let success = self.build(reporter).await?;
                    transition(phase, PhaseEvent::BuildFinished { success })?
                }
                RunPhase::Cleaning => {
                    let success = self.clean(reporter)?;
                    transition(phase, PhaseEvent::CleanFinished { success })?
                }
                RunPhase::Running => {
                    started = Instant::now();
                    results = self.run_tests(reporter).await?;
                    transition(phase, PhaseEvent::TestsFinished)?
                }
                RunPhase::Reporting => {
                    let summary = RunSummary::from_results(&results, started.elapsed());
                    reporter.summary(&summary)?;
                    info!(
                        passes = summary.passes.len(),
                        fails = summary.fails.len(),
                        skipped = summary.skipped.len(),
                        "run complete"
                    );
                    return Ok(PassOutcome::Completed(summary));
                }
                RunPhase::Aborted(step) => {
                    warn!(%step, "setup step failed; no tests were run");
                    return Ok(PassOutcome::Aborted(step));
                }
                RunPhase::Idle | RunPhase::Done => {
                    return Err(RunTestsError::Other(anyhow!(
                        "run cycle reached unexpected phase {phase:?}"
                    )));
                }
            };
        }
    }

    /// Returns `false` (after showing the captured output) when the build
    /// command fails.
    async fn build<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<bool> {
        reporter.phase("building...")?;
        let Some(cmd) = &self.config.build_cmd else {
            debug!("no build command configured; skipping build");
            return Ok(true);
        };

        reporter.command(cmd)?;
        let command = ResolvedCommand {
            line: 0,
            text: cmd.clone(),
        };
        let execution = self.executor.execute(command, None).await;
        if execution.passed() {
            Ok(true)
        } else {
            reporter.setup_failure(&SetupStep::Build.to_string(), &execution)?;
            Ok(false)
        }
    }

    /// Remove and recreate the temp directory.
    fn clean<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<bool> {
        reporter.phase("cleaning...")?;
        let temp_dir = self.temp_dir();

        match reset_dir(self.fs.as_ref(), &temp_dir) {
            Ok(()) => {
                reporter.phase("pre-run steps ok")?;
                reporter.blank()?;
                Ok(true)
            }
            Err(err) => {
                reporter.setup_error(&SetupStep::Clean.to_string(), &format!("{err:#}"))?;
                Ok(false)
            }
        }
    }

    async fn run_tests<W: Write>(&self, reporter: &mut Reporter<W>) -> Result<Vec<FileResult>> {
        reporter.phase("running...")?;
        reporter.blank()?;

        let root = &self.options.root;
        let discovered = discover_sources(self.fs.as_ref(), root, &self.config.extensions);
        let sources = self.config.filter.apply(&discovered);
        debug!(
            discovered = discovered.len(),
            selected = sources.len(),
            "filtered sources"
        );

        if sources.is_empty() {
            reporter.no_sources()?;
            return Ok(Vec::new());
        }

        let results = self
            .orchestrator
            .run_paths(Arc::clone(&self.fs), root, &sources)
            .await;

        for result in &results {
            reporter.file_result(result)?;
        }
        Ok(results)
    }
}

fn transition(from: RunPhase, event: PhaseEvent) -> Result<RunPhase> {
    let to = from.next(event).ok_or_else(|| {
        RunTestsError::Other(anyhow!("invalid run transition: {event:?} in {from:?}"))
    })?;
    debug!(?from, ?event, ?to, "run phase transition");
    Ok(to)
}

fn reset_dir(fs: &dyn FileSystem, dir: &Path) -> anyhow::Result<()> {
    if fs.exists(dir) {
        fs.remove_dir_all(dir)?;
    }
    fs.create_dir_all(dir)
}

/// Prompt and block until the user presses Enter. `false` on end of input.
async fn wait_for_rerun<W, R>(reporter: &mut Reporter<W>, input: &mut R) -> Result<bool>
where
    W: Write,
    R: AsyncBufRead + Unpin,
{
    reporter.blank()?;
    reporter.phase("Press Enter to rerun: ")?;
    let mut line = String::new();
    let read = input.read_line(&mut line).await?;
    Ok(read > 0)
}
