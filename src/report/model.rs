// src/report/model.rs

use std::time::{Duration, Instant};

use crate::directive::ResolvedCommand;

/// One discovered test file: its path as discovered plus its text, loaded
/// once and read-only for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSource {
    pub path: String,
    pub content: String,
}

/// How a single directive process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The process exited by itself. Signal deaths and spawn failures are
    /// recorded as `-1`.
    Exited(i32),
    /// The process exceeded the timeout and was terminated.
    TimedOut(Duration),
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Exited(0))
    }
}

/// Outcome of running one [`ResolvedCommand`].
#[derive(Debug, Clone)]
pub struct Execution {
    pub command: ResolvedCommand,
    pub status: ExecutionStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub started_at: Instant,
    pub elapsed: Duration,
}

impl Execution {
    /// A command that never produced a process outcome (spawn error, lost
    /// runner task). Recorded as exit `-1` with the error on stderr.
    pub fn failed_to_run(command: ResolvedCommand, started_at: Instant, error: &str) -> Self {
        Self {
            command,
            status: ExecutionStatus::Exited(-1),
            stdout: Vec::new(),
            stderr: error.as_bytes().to_vec(),
            started_at,
            elapsed: started_at.elapsed(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status.is_success()
    }

    pub fn finished_at(&self) -> Instant {
        self.started_at + self.elapsed
    }

    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Verdict for one test file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The file had no `RUN:` lines; it counts as neither pass nor fail.
    NoDirectives,
}

/// Every execution belonging to one test file, in directive order.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub source: String,
    pub executions: Vec<Execution>,
    /// Set when the file could not be read or its run could not complete;
    /// such a file always fails.
    pub error: Option<String>,
}

impl FileResult {
    pub fn new(source: impl Into<String>, executions: Vec<Execution>) -> Self {
        Self {
            source: source.into(),
            executions,
            error: None,
        }
    }

    pub fn errored(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            executions: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.error.is_some() {
            return Verdict::Fail;
        }
        if self.executions.is_empty() {
            return Verdict::NoDirectives;
        }
        if self.executions.iter().all(Execution::passed) {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }

    /// Commands run for this file, in directive order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.executions.iter().map(|e| e.command.text.as_str())
    }

    pub fn failing_executions(&self) -> impl Iterator<Item = &Execution> {
        self.executions.iter().filter(|e| !e.passed())
    }

    /// Wall-clock span of the file's run: latest end minus earliest start.
    pub fn duration(&self) -> Duration {
        let start = self.executions.iter().map(|e| e.started_at).min();
        let end = self.executions.iter().map(Execution::finished_at).max();
        match (start, end) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }
}

/// Aggregate over every file in one pass of the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: Vec<String>,
    pub fails: Vec<String>,
    /// Files without directives.
    pub skipped: Vec<String>,
    pub duration: Duration,
}

impl RunSummary {
    /// Partition results by verdict. Input order is kept within each set.
    pub fn from_results(results: &[FileResult], duration: Duration) -> Self {
        let mut summary = RunSummary {
            duration,
            ..Default::default()
        };
        for result in results {
            let bucket = match result.verdict() {
                Verdict::Pass => &mut summary.passes,
                Verdict::Fail => &mut summary.fails,
                Verdict::NoDirectives => &mut summary.skipped,
            };
            bucket.push(result.source.clone());
        }
        summary
    }

    pub fn all_passed(&self) -> bool {
        self.fails.is_empty()
    }
}
