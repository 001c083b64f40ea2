// src/discover/patterns.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;

use crate::errors::{Result, RunTestsError};

/// Compiled `**/*.<ext>` globs for the configured source extensions.
///
/// Matched against paths relative to the discovery root, with forward
/// slashes (e.g. `"tests/instruction/IAdd.java"`).
#[derive(Clone)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
    set: GlobSet,
}

impl fmt::Debug for ExtensionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionMatcher")
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl ExtensionMatcher {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut names = Vec::with_capacity(extensions.len());
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.');
            let pattern = format!("**/*.{ext}");
            let glob = Glob::new(&pattern).map_err(|e| RunTestsError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
            names.push(ext.to_string());
        }
        let set = builder.build().map_err(|e| RunTestsError::InvalidPattern {
            pattern: names.join(","),
            reason: e.to_string(),
        })?;
        Ok(Self {
            extensions: names,
            set,
        })
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }
}

/// Include/exclude filter over discovered source paths.
///
/// Both patterns are regular expressions anchored at the start of the path
/// (but not at the end), so `-f tests/instruction` selects everything under
/// that directory. A path survives when `include` matches and `exclude`
/// does not.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    include: Regex,
    exclude: Option<Regex>,
}

impl SourceFilter {
    pub fn new(include: &str, exclude: Option<&str>) -> Result<Self> {
        let include = compile_anchored(include)?;
        let exclude = exclude.map(compile_anchored).transpose()?;
        Ok(Self { include, exclude })
    }

    pub fn accepts(&self, path: &str) -> bool {
        if !self.include.is_match(path) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(path),
            None => true,
        }
    }

    /// Keep only the accepted paths, preserving order.
    pub fn apply<'a, I>(&self, paths: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        paths
            .into_iter()
            .filter(|p| self.accepts(p))
            .cloned()
            .collect()
    }
}

fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|e| RunTestsError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_matcher_matches_nested_and_top_level() {
        let m = ExtensionMatcher::new(&["java", ".txt"]).unwrap();
        assert_eq!(m.extensions(), &["java".to_string(), "txt".to_string()]);
        assert!(m.matches("tests/instruction/IAdd.java"));
        assert!(m.matches("A.txt"));
        assert!(!m.matches("src/main.rs"));
        assert!(!m.matches("tests/IAdd.java.orig"));
    }

    #[test]
    fn default_filter_accepts_everything() {
        let f = SourceFilter::new(".*", None).unwrap();
        assert!(f.accepts("tests/a/B.java"));
        assert!(f.accepts(""));
    }

    #[test]
    fn include_is_anchored_at_start_only() {
        let f = SourceFilter::new("tests/instruction", None).unwrap();
        assert!(f.accepts("tests/instruction/IAdd.java"));
        assert!(!f.accepts("old/tests/instruction/IAdd.java"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let f = SourceFilter::new(".*", Some(".*Thread")).unwrap();
        assert!(f.accepts("tests/program/Maps.java"));
        assert!(!f.accepts("tests/program/NewThread.java"));
    }

    #[test]
    fn match_nothing_exclude_excludes_nothing() {
        let f = SourceFilter::new(".*", Some("$^")).unwrap();
        assert!(f.accepts("tests/program/Maps.java"));
    }

    #[test]
    fn alternation_is_grouped_by_anchor() {
        let f = SourceFilter::new("a|b", None).unwrap();
        assert!(f.accepts("b/x.java"));
        assert!(!f.accepts("c/b.java"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = SourceFilter::new("(", None).unwrap_err();
        assert!(matches!(err, RunTestsError::InvalidPattern { .. }));
    }

    #[test]
    fn apply_preserves_order() {
        let f = SourceFilter::new("t", None).unwrap();
        let paths = vec!["t/b".to_string(), "x/a".to_string(), "t/a".to_string()];
        assert_eq!(f.apply(&paths), vec!["t/b".to_string(), "t/a".to_string()]);
    }
}
