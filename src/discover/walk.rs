// src/discover/walk.rs

use std::path::Path;

use tracing::{debug, trace, warn};

use crate::discover::patterns::ExtensionMatcher;
use crate::fs::FileSystem;

/// Collect every file under `root` whose extension is configured.
///
/// Returned paths are relative to `root`, with forward slashes, which is
/// the form substituted for `%s` and matched by the include/exclude filter.
/// Entries whose name starts with `.` are skipped, as are their contents.
/// Directories that cannot be listed are skipped with a warning. The result
/// is sorted.
pub fn discover_sources(
    fs: &dyn FileSystem,
    root: &Path,
    matcher: &ExtensionMatcher,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = ?dir, error = %e, "skipping unreadable directory");
                continue;
            }
        };
        for path in entries {
            if is_hidden(&path) {
                trace!(path = ?path, "skipping hidden entry");
                continue;
            }
            if fs.is_dir(&path) {
                stack.push(path);
            } else if fs.is_file(&path) {
                if let Some(rel) = relative_str(root, &path) {
                    if matcher.matches(&rel) {
                        found.push(rel);
                    }
                }
            }
        }
    }

    found.sort();
    debug!(count = found.len(), extensions = ?matcher.extensions(), "discovered sources");
    found
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Convert a path into a string relative to `root`, with forward slashes.
fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}
