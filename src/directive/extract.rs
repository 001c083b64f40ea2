// src/directive/extract.rs

use std::sync::LazyLock;

use regex::Regex;

/// Marker followed by the command. Horizontal whitespace only, so a bare
/// `RUN:` at the end of a line never swallows the next line.
static RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"RUN:[ \t]*(.+)").expect("RUN directive regex is valid")
});

/// A single `RUN:` line found in a test source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// 1-based line number within the source file.
    pub line: usize,
    /// The trimmed command text after the marker.
    pub command: String,
}

/// Extract all directives from `content`, in the order they appear.
///
/// A file without directives yields an empty vector.
pub fn extract_directives(content: &str) -> Vec<Directive> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let caps = RUN_REGEX.captures(line)?;
            let command = caps.get(1)?.as_str().trim();
            if command.is_empty() {
                return None;
            }
            Some(Directive {
                line: idx + 1,
                command: command.to_string(),
            })
        })
        .collect()
}
