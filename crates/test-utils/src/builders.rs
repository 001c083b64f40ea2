#![allow(dead_code)]

use runtests::config::{ConfigFile, RawConfigFile};
use runtests::types::DirectiveMode;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from the built-in defaults except that the build step is disabled
/// and sources are `.txt` files, which is what most tests want.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.run.build_cmd = String::new();
        config.discover.extensions = vec!["txt".to_string()];
        Self { config }
    }

    pub fn build_cmd(mut self, cmd: &str) -> Self {
        self.config.run.build_cmd = cmd.to_string();
        self
    }

    pub fn temp_dir(mut self, dir: &str) -> Self {
        self.config.run.temp_dir = dir.to_string();
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.run.timeout = timeout.to_string();
        self
    }

    pub fn sequential(mut self) -> Self {
        self.config.run.directive_mode = DirectiveMode::Sequential;
        self
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.config.discover.include = pattern.to_string();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.discover.exclude = Some(pattern.to_string());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
