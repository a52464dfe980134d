//! Code runner for Matics
//!
//! Provides high-level APIs for compiling and executing workspace submissions
//! with the host toolchains.

use thiserror::Error;
use tracing::debug;

pub use crate::runner::compile::{CompileResult, compile};
pub use crate::runner::execute::{execute, execute_interpreted};

mod compile;
mod execute;

use crate::{
    config::{Config, ConfigError, Language},
    process::ProcessError,
    types::ExecutionResult,
    workspace::{Workspace, WorkspaceError},
};

/// Request for compiling and running code in one step
#[derive(Debug)]
pub struct CompileAndRunRequest<'a> {
    /// The workspace holding the canonical files
    pub workspace: &'a Workspace,
    /// Language of the submission
    pub language: Language,
    /// Optional input to provide to the program
    pub input: Option<&'a [u8]>,
}

/// Errors that occur during compilation
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("language '{0}' does not support compilation")]
    NotCompiled(String),

    #[error("source '{0}' not found in workspace - write source first")]
    SourceMissing(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("compiler error: {0}")]
    Process(#[from] ProcessError),
}

/// Errors that occur during execution
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("execution not started: {0}")]
    NotStarted(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}

/// Errors that occur during compile-and-run operations
///
/// This error type preserves the full context of whether the error
/// occurred while writing the source, compiling, or executing.
#[derive(Debug, Error)]
pub enum CompileAndRunError {
    /// Error while persisting the submission
    #[error("failed to write source: {0}")]
    Workspace(#[from] WorkspaceError),

    /// Error during compilation phase
    #[error("compilation error: {0}")]
    Compile(#[from] CompileError),

    /// Error during execution phase (compilation succeeded)
    #[error("execution error: {0}")]
    Execute(#[from] ExecuteError),
}

/// High-level runner for code execution
#[derive(Debug, Clone)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Create a new runner with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Create a new runner with default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile the canonical source file
    pub async fn compile(
        &self,
        workspace: &Workspace,
        language: Language,
    ) -> Result<CompileResult, CompileError> {
        compile::compile(workspace, &self.config, language).await
    }

    /// Run a program with batch I/O
    pub async fn run(
        &self,
        workspace: &Workspace,
        language: Language,
        input: Option<&[u8]>,
    ) -> Result<ExecutionResult, ExecuteError> {
        execute::execute(workspace, &self.config, language, input).await
    }

    /// Run an interpreted program (writes source and executes)
    pub async fn run_interpreted(
        &self,
        workspace: &Workspace,
        language: Language,
        source: &str,
        input: Option<&[u8]>,
    ) -> Result<ExecutionResult, ExecuteError> {
        execute::execute_interpreted(workspace, &self.config, language, source, input).await
    }

    /// Compile (when the language needs it) and run in one step
    ///
    /// Returns the compile result, if there was a compile step, and the run
    /// result. The run result is `None` when compilation fails.
    pub async fn compile_and_run(
        &self,
        request: CompileAndRunRequest<'_>,
    ) -> Result<(Option<CompileResult>, Option<ExecutionResult>), CompileAndRunError> {
        let lang = self
            .config
            .get_language(request.language)
            .map_err(CompileError::from)?;

        let compile_result = if lang.is_compiled() {
            let result = self.compile(request.workspace, request.language).await?;
            if !result.success {
                return Ok((Some(result), None));
            }
            Some(result)
        } else {
            None
        };

        let run_result = self
            .run(request.workspace, request.language, request.input)
            .await?;
        Ok((compile_result, Some(run_result)))
    }

    /// Write `source` to the canonical file, then compile and run it.
    ///
    /// On a failed compilation the compiler's result is returned and the
    /// program is not started.
    pub async fn execute(
        &self,
        workspace: &Workspace,
        language: Language,
        source: &str,
        input: &str,
    ) -> Result<ExecutionResult, CompileAndRunError> {
        workspace.write(language, source).await?;

        let lang = self
            .config
            .get_language(language)
            .map_err(CompileError::from)?;
        if lang.is_compiled() {
            let compiled = self.compile(workspace, language).await?;
            if !compiled.success {
                debug!(language = %language, "compilation failed, skipping run");
                return Ok(compiled.execution);
            }
        }

        Ok(self.run(workspace, language, Some(input.as_bytes())).await?)
    }
}
