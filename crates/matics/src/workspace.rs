//! Workspace store
//!
//! Owns the directory that holds one canonical source file per language,
//! the compiled outputs, and any scaffolded projects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::{Config, Language};

/// Errors that occur while managing workspace files
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported language '{0}': no toolchain configured")]
    UnsupportedLanguage(Language),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid project name '{0}': use letters, digits and underscores")]
    InvalidProjectName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory with one canonical file per configured language
///
/// Every write overwrites the previous submission for that language.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    sources: HashMap<Language, String>,
}

impl Workspace {
    /// Open the workspace described by `config`, creating its directory if needed.
    ///
    /// The root is made absolute so processes can use it as a working directory.
    #[instrument(skip(config), fields(dir = %config.workspace_dir.display()))]
    pub async fn open(config: &Config) -> Result<Self, WorkspaceError> {
        let mut root = config.workspace_dir.clone();
        if root.is_relative() {
            let cwd = std::env::current_dir().map_err(|source| WorkspaceError::CreateDir {
                path: root.clone(),
                source,
            })?;
            root = cwd.join(root);
        }

        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| WorkspaceError::CreateDir {
                path: root.clone(),
                source,
            })?;

        let sources = Language::ALL
            .into_iter()
            .filter_map(|language| {
                config
                    .get_language(language)
                    .ok()
                    .map(|lang| (language, lang.source_name.to_string()))
            })
            .collect();

        debug!(root = %root.display(), "workspace ready");
        Ok(Self { root, sources })
    }

    /// Absolute workspace directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical source path for a language
    pub fn path_for(&self, language: Language) -> Result<PathBuf, WorkspaceError> {
        let name = self
            .sources
            .get(&language)
            .ok_or(WorkspaceError::UnsupportedLanguage(language))?;
        self.file_path(name)
    }

    /// Overwrite the canonical source file for a language
    #[instrument(skip(self, source))]
    pub async fn write(&self, language: Language, source: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.path_for(language)?;
        tokio::fs::write(&path, source).await?;
        debug!(path = %path.display(), len = source.len(), "wrote source file");
        Ok(path)
    }

    /// Get the path to a file inside the workspace
    ///
    /// Returns an error if the name would escape the workspace.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, WorkspaceError> {
        if name.is_empty() || name.contains("..") || name.starts_with(['/', '\\']) {
            return Err(WorkspaceError::InvalidPath(format!(
                "path must stay inside the workspace: {name}"
            )));
        }
        Ok(self.root.join(name))
    }

    /// Check if a file exists in the workspace
    pub async fn file_exists(&self, name: &str) -> Result<bool, WorkspaceError> {
        let path = self.file_path(name)?;
        Ok(tokio::fs::metadata(&path).await.is_ok())
    }

    /// Read a file from the workspace
    pub async fn read_file(&self, name: &str) -> Result<String, WorkspaceError> {
        let path = self.file_path(name)?;
        Ok(tokio::fs::read_to_string(&path).await?)
    }

    /// Delete a file if present; returns whether it existed
    #[instrument(skip(self))]
    pub async fn remove_file(&self, name: &str) -> Result<bool, WorkspaceError> {
        let path = self.file_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed file");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Directory for a scaffolded project
    pub fn project_dir(&self, project: &str) -> Result<PathBuf, WorkspaceError> {
        let valid = project
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && project.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(WorkspaceError::InvalidProjectName(project.to_owned()));
        }
        Ok(self.root.join(project))
    }
}
