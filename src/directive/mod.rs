// src/directive/mod.rs

//! Directive handling: turning a test source's text into the shell commands
//! that will be executed for it.
//!
//! - [`extract`] finds the `RUN:` lines in a file, in file order.
//! - [`tokens`] rewrites `%s`, `%t` and the tool alias inside each command.

pub mod extract;
pub mod tokens;

pub use extract::{extract_directives, Directive};
pub use tokens::{ResolvedCommand, TokenSubstitutor};
