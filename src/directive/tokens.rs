// src/directive/tokens.rs

//! Placeholder token substitution.
//!
//! Recognised tokens:
//! - `%s`: the source file's path, exactly as discovered
//! - `%t`: the shared temp directory for this run
//! - the tool alias (e.g. `run-tool`): the configured tool invocation prefix
//!
//! Replacement is literal and applied in that order. A replacement value
//! must not itself contain a token, otherwise it would be substituted again
//! by a later step. Unknown `%x` sequences are left untouched.

use std::path::Path;

use super::extract::Directive;

pub const SOURCE_TOKEN: &str = "%s";
pub const TEMP_TOKEN: &str = "%t";

/// A directive after token substitution: the literal text handed to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Line of the originating directive.
    pub line: usize,
    pub text: String,
}

/// Rewrites directive commands for a run.
///
/// Built once per run from the configured temp dir and tool alias; the
/// source path is supplied per call.
#[derive(Debug, Clone)]
pub struct TokenSubstitutor {
    temp_dir: String,
    tool_alias: String,
    tool_invocation: String,
}

impl TokenSubstitutor {
    pub fn new(
        temp_dir: impl AsRef<Path>,
        tool_alias: impl Into<String>,
        tool_invocation: impl Into<String>,
    ) -> Self {
        Self {
            temp_dir: temp_dir.as_ref().to_string_lossy().into_owned(),
            tool_alias: tool_alias.into(),
            tool_invocation: tool_invocation.into(),
        }
    }

    /// Substitute all tokens in `command` for the given source.
    pub fn substitute(&self, command: &str, source: &Path) -> String {
        let source = source.to_string_lossy();
        let mut out = command.replace(SOURCE_TOKEN, &source);
        out = out.replace(TEMP_TOKEN, &self.temp_dir);
        if !self.tool_alias.is_empty() {
            out = out.replace(&self.tool_alias, &self.tool_invocation);
        }
        out
    }

    /// Resolve every directive of one source, keeping file order.
    pub fn resolve_all(&self, directives: &[Directive], source: &Path) -> Vec<ResolvedCommand> {
        directives
            .iter()
            .map(|d| ResolvedCommand {
                line: d.line,
                text: self.substitute(&d.command, source),
            })
            .collect()
    }
}
