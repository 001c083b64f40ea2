// src/discover/mod.rs

//! Test source discovery and path filtering.
//!
//! - [`patterns`] compiles the extension globs and the include/exclude
//!   regexes.
//! - [`walk`] walks the project root and collects candidate sources.

pub mod patterns;
pub mod walk;

pub use patterns::{ExtensionMatcher, SourceFilter};
pub use walk::discover_sources;
