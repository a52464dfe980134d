use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub use crate::config::framework::{FrameworkConfig, WebFramework};
pub use crate::config::language::{
    CompileConfig, FileName, Language, LanguageConfig, RunConfig, binary_invocation,
    executable_file_name, expand_command,
};

pub mod framework;
pub mod language;
mod loader;

/// Example configuration embedded at compile time.
///
/// Library users can access this to generate a starter config file.
pub const EXAMPLE_CONFIG: &str = include_str!("../../matics.example.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid file name '{0}': must not contain a directory")]
    InvalidFileName(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] config::ConfigError),

    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("unsupported web framework '{0}'")]
    UnsupportedFramework(String),

    #[error("language '{0}' not found in configuration")]
    LanguageNotFound(String),

    #[error("framework '{0}' not found in configuration")]
    FrameworkNotFound(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Config for Matics
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory that holds the canonical source files and build outputs
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// Host used when reporting server URLs
    #[serde(default = "default_host")]
    pub host: String,

    /// Project name for scaffolding frameworks when the caller gives none
    #[serde(default = "default_project")]
    pub default_project: String,

    /// Language configurations keyed by language ID
    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,

    /// Web framework configurations keyed by framework ID
    #[serde(default)]
    pub frameworks: HashMap<String, FrameworkConfig>,
}

impl Config {
    /// Create a new config with embedded default languages
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty config with no languages or frameworks
    pub fn empty() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            host: default_host(),
            default_project: default_project(),
            languages: HashMap::new(),
            frameworks: HashMap::new(),
        }
    }

    /// Get a language's toolchain configuration
    pub fn get_language(&self, language: Language) -> Result<&LanguageConfig, ConfigError> {
        self.languages
            .get(language.id())
            .ok_or_else(|| ConfigError::LanguageNotFound(language.id().to_owned()))
    }

    /// Get a framework's launch configuration
    pub fn get_framework(&self, framework: WebFramework) -> Result<&FrameworkConfig, ConfigError> {
        self.frameworks
            .get(framework.id())
            .ok_or_else(|| ConfigError::FrameworkNotFound(framework.id().to_owned()))
    }

    /// Replace the workspace directory (e.g., from a CLI flag)
    pub fn with_workspace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workspace_dir = dir.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_toml(EXAMPLE_CONFIG).expect("embedded default config should be valid")
    }
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("temp_files")
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_project() -> String {
    "myproject".to_owned()
}
