// src/engine/mod.rs

//! Run controller for run-tests.
//!
//! The pure lifecycle state machine lives in [`state`]; the async/IO shell
//! that builds, cleans, runs and reports is implemented in [`controller`].

pub mod controller;
pub mod state;

pub use controller::{Controller, PassOutcome, RunExit, RunOptions};
pub use state::{PhaseEvent, RunPhase, SetupStep};
