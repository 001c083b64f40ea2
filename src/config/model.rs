// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::discover::{ExtensionMatcher, SourceFilter};
use crate::types::DirectiveMode;

/// Top-level configuration as read from `RunTests.toml`.
///
/// ```toml
/// [run]
/// build_cmd = "cargo build"
/// temp_dir = ".temp"
/// timeout = "10s"
///
/// [discover]
/// extensions = ["java"]
/// include = "tests/.*"
///
/// [tokens]
/// tool_alias = "run-tool"
/// tool_invocation = "cargo run --"
/// ```
///
/// All sections are optional and have reasonable defaults; a missing file is
/// the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,

    #[serde(default)]
    pub discover: DiscoverSection,

    #[serde(default)]
    pub tokens: TokensSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Build step run before any test. Empty string skips the step.
    #[serde(default = "default_build_cmd")]
    pub build_cmd: String,

    /// Directory substituted for `%t`; wiped and recreated before each run.
    /// Relative paths are resolved against the project root.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,

    /// Per-process timeout, e.g. `"10s"` or `"500ms"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,

    #[serde(default)]
    pub directive_mode: DirectiveMode,

    /// Exit nonzero when any test fails. Off by default: only build and
    /// clean failures affect the exit status.
    #[serde(default)]
    pub fail_on_test_failure: bool,
}

fn default_build_cmd() -> String {
    "cargo build".to_string()
}

fn default_temp_dir() -> String {
    ".temp".to_string()
}

fn default_timeout() -> String {
    "10s".to_string()
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            build_cmd: default_build_cmd(),
            temp_dir: default_temp_dir(),
            timeout: default_timeout(),
            directive_mode: DirectiveMode::default(),
            fail_on_test_failure: false,
        }
    }
}

/// `[discover]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscoverSection {
    /// File extensions (without the dot) searched recursively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Regex a source path must match (anchored at the start).
    #[serde(default = "default_include")]
    pub include: String,

    /// Regex that removes matching source paths (anchored at the start).
    #[serde(default)]
    pub exclude: Option<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["java".to_string()]
}

fn default_include() -> String {
    ".*".to_string()
}

impl Default for DiscoverSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            include: default_include(),
            exclude: None,
        }
    }
}

/// `[tokens]` section.
///
/// Neither value may contain `%s`, `%t` or the alias itself, or the
/// substituted command would be rewritten a second time.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokensSection {
    #[serde(default = "default_tool_alias")]
    pub tool_alias: String,

    #[serde(default = "default_tool_invocation")]
    pub tool_invocation: String,
}

fn default_tool_alias() -> String {
    "run-tool".to_string()
}

fn default_tool_invocation() -> String {
    "cargo run --".to_string()
}

impl Default for TokensSection {
    fn default() -> Self {
        Self {
            tool_alias: default_tool_alias(),
            tool_invocation: default_tool_invocation(),
        }
    }
}

/// Validated configuration.
///
/// Produced from [`RawConfigFile`] via `TryFrom`, which parses the timeout
/// and compiles the discovery patterns.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub build_cmd: Option<String>,
    pub temp_dir: PathBuf,
    pub timeout: Duration,
    pub directive_mode: DirectiveMode,
    pub fail_on_test_failure: bool,
    pub extensions: ExtensionMatcher,
    pub filter: SourceFilter,
    pub tool_alias: String,
    pub tool_invocation: String,
}
