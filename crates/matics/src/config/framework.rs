use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// A web framework that can be served from the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WebFramework {
    /// Project-scaffolding framework; runs its dev server inside the project
    Django,
    /// Micro-framework; the canonical source file is the server
    Flask,
    /// UI framework; the canonical source file runs under its own launcher
    Streamlit,
}

impl WebFramework {
    pub const ALL: [WebFramework; 3] = [
        WebFramework::Django,
        WebFramework::Flask,
        WebFramework::Streamlit,
    ];

    /// Identifier used as the key in the `[frameworks]` config table
    pub fn id(&self) -> &'static str {
        match self {
            WebFramework::Django => "django",
            WebFramework::Flask => "flask",
            WebFramework::Streamlit => "streamlit",
        }
    }
}

impl fmt::Display for WebFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WebFramework::Django => "Django",
            WebFramework::Flask => "Flask",
            WebFramework::Streamlit => "Streamlit",
        };
        f.write_str(name)
    }
}

impl FromStr for WebFramework {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "django" => Ok(WebFramework::Django),
            "flask" => Ok(WebFramework::Flask),
            "streamlit" => Ok(WebFramework::Streamlit),
            _ => Err(ConfigError::UnsupportedFramework(s.to_owned())),
        }
    }
}

/// Launch configuration for one web framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameworkConfig {
    /// Human-readable name
    pub name: String,

    /// Fixed port the dev server binds to
    pub port: u16,

    /// Server command with placeholders: {source}, {port}, {project}, {project_dir}
    pub command: Vec<String>,

    /// Project scaffolding command. When set, the server runs inside the
    /// project directory, which is created on first use.
    #[serde(default)]
    pub scaffold: Option<Vec<String>>,

    /// Command that installs the framework's packages
    #[serde(default)]
    pub install: Option<Vec<String>>,

    /// Environment variables for the server process
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl FrameworkConfig {
    /// Whether the framework needs a scaffolded project directory
    pub fn is_scaffolded(&self) -> bool {
        self.scaffold.is_some()
    }

    /// URL the server is reachable at
    pub fn url(&self, host: &str) -> String {
        format!("http://{host}:{}", self.port)
    }
}
