// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running directive commands, using
//! `tokio::process::Command`, and turning each process into an
//! [`Execution`](crate::report::Execution).
//!
//! - [`process`] runs one shell command with captured output and timeout.
//! - [`backend`] provides the `ExecutorBackend` trait and the concrete
//!   `ShellExecutor` used in production, which tests can replace with a
//!   fake implementation.
//! - [`orchestrator`] fans sources and directives out concurrently and
//!   gathers the results back in order.

pub mod backend;
pub mod orchestrator;
pub mod process;

pub use backend::{ExecutionFuture, ExecutorBackend, ShellExecutor};
pub use orchestrator::Orchestrator;
