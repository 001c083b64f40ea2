// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawConfigFile;
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** parse durations
/// or compile patterns. That happens in `ConfigFile::try_from`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load the raw config the CLI should start from.
///
/// - An explicitly requested file must exist.
/// - Otherwise [`default_config_path`] is used when present, and built-in
///   defaults when it is not.
pub fn load_raw_or_default(explicit: Option<&Path>) -> Result<RawConfigFile> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = ?default_path, "loading default config file");
        load_from_path(&default_path)
    } else {
        debug!("no config file found; using built-in defaults");
        Ok(RawConfigFile::default())
    }
}

/// `RunTests.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("RunTests.toml")
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::config::model::ConfigFile;
    use crate::errors::RunTestsError;
    use crate::types::DirectiveMode;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[run]
timeout = "3s"
directive_mode = "sequential"

[discover]
extensions = ["txt", "java"]
exclude = ".*Thread"
"#
        )
        .unwrap();

        let cfg = ConfigFile::try_from(load_from_path(file.path()).unwrap()).unwrap();
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(cfg.directive_mode, DirectiveMode::Sequential);
        assert_eq!(cfg.build_cmd.as_deref(), Some("cargo build"));
        assert_eq!(cfg.tool_alias, "run-tool");
        assert!(cfg.filter.accepts("tests/Maps.java"));
        assert!(!cfg.filter.accepts("tests/NewThread.java"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[run]\nbuild = \"make\"\n").unwrap();

        assert!(matches!(
            load_from_path(file.path()),
            Err(RunTestsError::TomlError(_))
        ));
    }

    #[test]
    fn invalid_directive_mode_is_a_toml_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[run]\ndirective_mode = \"parallel\"\n").unwrap();

        assert!(matches!(
            load_from_path(file.path()),
            Err(RunTestsError::TomlError(_))
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_io_error() {
        let err = load_raw_or_default(Some(Path::new("/no/such/RunTests.toml"))).unwrap_err();
        assert!(matches!(err, RunTestsError::IoError(_)));
    }
}
