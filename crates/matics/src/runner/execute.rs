//! Execution step for code running
//!
//! Handles running compiled or interpreted programs with input/output.

use tracing::{debug, instrument};

use crate::config::{Config, Language, expand_command};
use crate::process::{ProcessCommand, run_captured};
use crate::runner::ExecuteError;
use crate::types::{ExecutionResult, ExecutionStage};
use crate::workspace::Workspace;

/// Run the language's program from the workspace, feeding `input` on stdin
#[instrument(skip(workspace, config, input))]
pub async fn execute(
    workspace: &Workspace,
    config: &Config,
    language: Language,
    input: Option<&[u8]>,
) -> Result<ExecutionResult, ExecuteError> {
    let lang = config.get_language(language)?;

    // Compiled languages need their artifact, interpreted ones their source
    let required = match lang.output_name() {
        Some(output) => output,
        None => lang.source_name.to_string(),
    };
    if !workspace.file_exists(&required).await? {
        let hint = if lang.is_compiled() {
            "was compilation run?"
        } else {
            "write source first"
        };
        return Err(ExecuteError::NotStarted(format!(
            "'{required}' not found in workspace - {hint}"
        )));
    }

    let vars = lang.placeholders(workspace.root());
    let run_cmd = expand_command(&lang.run.command, &vars);

    debug!(?run_cmd, "executing program");

    let command = ProcessCommand::new(run_cmd)
        .working_dir(workspace.root())
        .envs(&lang.run.env);

    let result = run_captured(&command, ExecutionStage::Run, input).await?;

    debug!(
        exit_code = ?result.exit_code,
        signal = ?result.signal,
        elapsed_ms = result.elapsed.as_millis() as u64,
        "execution complete"
    );

    Ok(result)
}

/// Write the source and run it; only valid for interpreted languages
#[instrument(skip(workspace, config, source, input))]
pub async fn execute_interpreted(
    workspace: &Workspace,
    config: &Config,
    language: Language,
    source: &str,
    input: Option<&[u8]>,
) -> Result<ExecutionResult, ExecuteError> {
    let lang = config.get_language(language)?;
    if lang.is_compiled() {
        return Err(ExecuteError::NotStarted(format!(
            "{} must be compiled before it can run",
            lang.name
        )));
    }

    workspace.write(language, source).await?;

    debug!("wrote source file for interpreted execution");

    execute(workspace, config, language, input).await
}
