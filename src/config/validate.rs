// src/config/validate.rs

use std::path::PathBuf;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::discover::{ExtensionMatcher, SourceFilter};
use crate::errors::{Result, RunTestsError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RunTestsError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;

        let timeout = parse_duration(&raw.run.timeout)
            .map_err(|e| RunTestsError::ConfigError(format!("[run].timeout: {e}")))?;
        let extensions = ExtensionMatcher::new(&raw.discover.extensions)?;
        let filter = SourceFilter::new(&raw.discover.include, raw.discover.exclude.as_deref())?;

        let build_cmd = Some(raw.run.build_cmd.trim().to_string()).filter(|c| !c.is_empty());

        Ok(ConfigFile {
            build_cmd,
            temp_dir: PathBuf::from(raw.run.temp_dir),
            timeout,
            directive_mode: raw.run.directive_mode,
            fail_on_test_failure: raw.run.fail_on_test_failure,
            extensions,
            filter,
            tool_alias: raw.tokens.tool_alias,
            tool_invocation: raw.tokens.tool_invocation,
        })
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_run_section(cfg)?;
    validate_discover_section(cfg)?;
    validate_tokens_section(cfg)?;
    Ok(())
}

fn validate_run_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.run.temp_dir.trim().is_empty() {
        return Err(RunTestsError::ConfigError(
            "[run].temp_dir must not be empty".to_string(),
        ));
    }

    match parse_duration(&cfg.run.timeout) {
        Ok(d) if d.is_zero() => Err(RunTestsError::ConfigError(
            "[run].timeout must be greater than zero".to_string(),
        )),
        Ok(_) => Ok(()),
        Err(e) => Err(RunTestsError::ConfigError(format!("[run].timeout: {e}"))),
    }
}

fn validate_discover_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.discover.extensions.is_empty() {
        return Err(RunTestsError::ConfigError(
            "[discover].extensions must list at least one extension".to_string(),
        ));
    }
    if let Some(bad) = cfg
        .discover
        .extensions
        .iter()
        .find(|e| e.trim().trim_start_matches('.').is_empty())
    {
        return Err(RunTestsError::ConfigError(format!(
            "[discover].extensions contains an empty extension ({bad:?})"
        )));
    }
    Ok(())
}

fn validate_tokens_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.tokens.tool_alias.trim().is_empty() {
        return Err(RunTestsError::ConfigError(
            "[tokens].tool_alias must not be empty".to_string(),
        ));
    }
    Ok(())
}
