//! Compilation step for code execution
//!
//! Handles compiling the canonical source file with the language's compiler.

use tracing::{debug, instrument};

use crate::config::{Config, Language, expand_command};
use crate::process::{ProcessCommand, run_captured};
use crate::runner::CompileError;
use crate::types::{ExecutionResult, ExecutionStage};
use crate::workspace::Workspace;

/// Result of a compilation
#[derive(Debug, Clone)]
pub struct CompileResult {
    /// Whether compilation succeeded
    pub success: bool,

    /// Execution result from the compiler process
    pub execution: ExecutionResult,
}

impl CompileResult {
    /// Check if compilation was successful
    pub fn is_success(&self) -> bool {
        self.success && self.execution.exit_code == Some(0)
    }

    /// Compiler diagnostics: stdout and stderr joined
    pub fn output(&self) -> String {
        let stdout = &self.execution.stdout;
        let stderr = &self.execution.stderr;
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, _) => stderr.clone(),
            (false, true) => stdout.clone(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

/// Compile the language's canonical source file in the workspace.
///
/// Any output left by a previous compilation is deleted first, so a failed
/// build can never leave an outdated program behind to be run.
#[instrument(skip(workspace, config))]
pub async fn compile(
    workspace: &Workspace,
    config: &Config,
    language: Language,
) -> Result<CompileResult, CompileError> {
    let lang = config.get_language(language)?;
    let compile_config = lang
        .compile
        .as_ref()
        .ok_or_else(|| CompileError::NotCompiled(lang.name.clone()))?;

    if !workspace.file_exists(lang.source_name.as_str()).await? {
        return Err(CompileError::SourceMissing(lang.source_name.to_string()));
    }

    let output = compile_config.artifact_name();
    if workspace.remove_file(&output).await? {
        debug!(%output, "removed stale output");
    }

    let vars = lang.placeholders(workspace.root());
    let command = ProcessCommand::new(expand_command(&compile_config.command, &vars))
        .working_dir(workspace.root())
        .envs(&compile_config.env);

    let mut execution = run_captured(&command, ExecutionStage::Compile, None).await?;

    // A zero exit without the artifact still cannot be run.
    let mut success = execution.exit_code == Some(0);
    if success && !workspace.file_exists(&output).await? {
        success = false;
        execution.message = Some(format!(
            "compiler exited cleanly but produced no '{output}'"
        ));
    }

    debug!(
        success,
        exit_code = ?execution.exit_code,
        "compilation complete"
    );

    Ok(CompileResult { success, execution })
}
