// src/report/mod.rs

//! Result aggregation and reporting.
//!
//! [`model`] holds the data produced by a run (executions, per-file results,
//! the run summary); [`printer`] renders them.

pub mod color;
pub mod model;
pub mod printer;

pub use model::{Execution, ExecutionStatus, FileResult, RunSummary, TestSource, Verdict};
pub use printer::Reporter;
