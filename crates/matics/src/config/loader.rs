//! Configuration file loading for Matics
//!
//! Handles loading and parsing configuration files using the config crate.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use config::{Config as ConfigBuilder, File, FileFormat};

use crate::config::{Config, ConfigError, Language, WebFramework};

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = ConfigBuilder::builder()
            .add_source(File::from(path))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config = ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Toml))
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        if self.workspace_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("workspace_dir is empty".to_owned()));
        }

        for (id, lang) in &self.languages {
            Language::from_str(id)
                .map_err(|_| ConfigError::Invalid(format!("unknown language '{id}'")))?;
            if lang.name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty name"
                )));
            }
            if lang.source_name.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty source_name"
                )));
            }
            if lang.run.command.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "language '{id}' has empty run command"
                )));
            }
            if let Some(ref compile) = lang.compile {
                if compile.command.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "language '{id}' has empty compile command"
                    )));
                }
                if compile.output_name.is_empty() || compile.output_name.contains(['/', '\\']) {
                    return Err(ConfigError::Invalid(format!(
                        "language '{id}' has invalid output_name '{}'",
                        compile.output_name
                    )));
                }
                if compile.artifact_name() == lang.source_name.as_str() {
                    return Err(ConfigError::Invalid(format!(
                        "language '{id}' compiles over its own source file"
                    )));
                }
            }
        }

        let mut ports = HashSet::new();
        for (id, framework) in &self.frameworks {
            WebFramework::from_str(id)
                .map_err(|_| ConfigError::Invalid(format!("unknown framework '{id}'")))?;
            if framework.command.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "framework '{id}' has empty command"
                )));
            }
            if framework.port == 0 {
                return Err(ConfigError::Invalid(format!(
                    "framework '{id}' must use a fixed, non-zero port"
                )));
            }
            if !ports.insert(framework.port) {
                return Err(ConfigError::Invalid(format!(
                    "framework '{id}' reuses port {}",
                    framework.port
                )));
            }
            if framework.scaffold.as_ref().is_some_and(Vec::is_empty) {
                return Err(ConfigError::Invalid(format!(
                    "framework '{id}' has empty scaffold command"
                )));
            }
            if framework.install.as_ref().is_some_and(Vec::is_empty) {
                return Err(ConfigError::Invalid(format!(
                    "framework '{id}' has empty install command"
                )));
            }
        }

        Ok(())
    }
}
