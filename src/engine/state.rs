// src/engine/state.rs

//! Pure run-lifecycle state machine.
//!
//! ```text
//! Idle -> Building -> Cleaning -> Running -> Reporting -> Idle (watch)
//!            |           |                           \-> Done
//!            \-----------+--> Aborted
//! ```
//!
//! The controller performs the side effects of each phase and feeds the
//! outcome back in as a [`PhaseEvent`].

use std::fmt;

/// Setup step that can abort a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Build,
    Clean,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupStep::Build => f.write_str("build"),
            SetupStep::Clean => f.write_str("clean"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Building,
    Cleaning,
    Running,
    Reporting,
    /// Terminal: the run finished and will not repeat.
    Done,
    /// Terminal: a setup step failed and no tests were run.
    Aborted(SetupStep),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    Start,
    BuildFinished { success: bool },
    CleanFinished { success: bool },
    TestsFinished,
    /// Watch mode: the user asked for another cycle.
    Rerun,
    Stop,
}

impl RunPhase {
    /// Next phase for `event`, or `None` if the event is not valid here.
    pub fn next(self, event: PhaseEvent) -> Option<RunPhase> {
        use PhaseEvent as E;
        use RunPhase as P;

        match (self, event) {
            (P::Idle, E::Start) => Some(P::Building),
            (P::Building, E::BuildFinished { success: true }) => Some(P::Cleaning),
            (P::Building, E::BuildFinished { success: false }) => Some(P::Aborted(SetupStep::Build)),
            (P::Cleaning, E::CleanFinished { success: true }) => Some(P::Running),
            (P::Cleaning, E::CleanFinished { success: false }) => Some(P::Aborted(SetupStep::Clean)),
            (P::Running, E::TestsFinished) => Some(P::Reporting),
            (P::Reporting, E::Rerun) => Some(P::Idle),
            (P::Reporting, E::Stop) => Some(P::Done),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Done | RunPhase::Aborted(_))
    }
}
