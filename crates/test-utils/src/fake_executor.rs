use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use runtests::directive::ResolvedCommand;
use runtests::exec::{ExecutionFuture, ExecutorBackend};
use runtests::report::{Execution, ExecutionStatus};

/// Canned outcome for one command text.
#[derive(Debug, Clone)]
pub struct FakeOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Simulated run time. When it exceeds the timeout passed to
    /// `execute`, the execution is reported as timed out.
    pub delay: Duration,
}

impl FakeOutcome {
    pub fn pass() -> Self {
        Self {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn fail(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::pass()
        }
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.stdout = text.to_string();
        self
    }

    pub fn stderr(mut self, text: &str) -> Self {
        self.stderr = text.to_string();
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A fake executor that:
/// - records which commands were "run", in start order
/// - returns a canned outcome per command text (success by default)
/// - tracks the highest number of commands in flight at once.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    outcomes: Arc<Mutex<HashMap<String, FakeOutcome>>>,
    executed: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<Mutex<(usize, usize)>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outcome for an exact command text.
    pub fn on(self, command: &str, outcome: FakeOutcome) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(command.to_string(), outcome);
        self
    }

    /// Commands in the order their execution started.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Highest number of commands that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.in_flight.lock().unwrap().1
    }
}

impl ExecutorBackend for FakeExecutor {
    fn execute(&self, command: ResolvedCommand, timeout: Option<Duration>) -> ExecutionFuture {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(&command.text)
            .cloned()
            .unwrap_or_else(FakeOutcome::pass);
        let executed = Arc::clone(&self.executed);
        let in_flight = Arc::clone(&self.in_flight);

        Box::pin(async move {
            let started_at = Instant::now();
            executed.lock().unwrap().push(command.text.clone());
            {
                let mut guard = in_flight.lock().unwrap();
                guard.0 += 1;
                guard.1 = guard.1.max(guard.0);
            }

            let status = match timeout {
                Some(limit) if outcome.delay > limit => {
                    tokio::time::sleep(limit).await;
                    ExecutionStatus::TimedOut(limit)
                }
                _ => {
                    tokio::time::sleep(outcome.delay).await;
                    ExecutionStatus::Exited(outcome.exit_code)
                }
            };

            in_flight.lock().unwrap().0 -= 1;

            Execution {
                command,
                status,
                stdout: outcome.stdout.into_bytes(),
                stderr: outcome.stderr.into_bytes(),
                started_at,
                elapsed: started_at.elapsed(),
            }
        })
    }
}
