// src/config/mod.rs

//! Configuration loading and validation for run-tests.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into typed settings (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_from_path, load_raw_or_default};
pub use model::{ConfigFile, DiscoverSection, RawConfigFile, RunSection, TokensSection};
