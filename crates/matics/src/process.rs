//! Process spawning and I/O
//!
//! Handles one-shot commands with captured output and long-running
//! server processes whose output is never awaited.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::{debug, instrument, warn};

use crate::types::{ExecutionResult, ExecutionStage};

/// Errors that occur while launching or talking to a subprocess
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to start '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builder for a subprocess invocation
#[derive(Debug, Clone)]
pub struct ProcessCommand {
    /// Program followed by its arguments
    argv: Vec<String>,
    /// Working directory (inherited if unset)
    working_dir: Option<PathBuf>,
    /// Extra environment variables
    env: HashMap<String, String>,
}

impl ProcessCommand {
    /// Create a command from a program and its arguments
    pub fn new(argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            working_dir: None,
            env: HashMap::new(),
        }
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set several environment variables
    pub fn envs<'a>(mut self, vars: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        for (key, value) in vars {
            self.env.insert(key.clone(), value.clone());
        }
        self
    }

    /// The program name
    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    /// Program and arguments
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    fn build(&self) -> Result<Command, ProcessError> {
        let (program, args) = self.argv.split_first().ok_or(ProcessError::EmptyCommand)?;
        let mut command = Command::new(program);
        command.args(args).envs(&self.env);
        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }
        Ok(command)
    }

    fn spawn_error(&self, source: std::io::Error) -> ProcessError {
        ProcessError::SpawnFailed {
            program: self.program().unwrap_or_default().to_owned(),
            source,
        }
    }
}

/// Run a command to completion, feeding `stdin_data` and capturing both streams.
///
/// The child is killed if the returned future is dropped before it exits.
#[instrument(skip(command, stdin_data), fields(argv = ?command.argv()))]
pub async fn run_captured(
    command: &ProcessCommand,
    stage: ExecutionStage,
    stdin_data: Option<&[u8]>,
) -> Result<ExecutionResult, ProcessError> {
    let mut child = command
        .build()?
        .stdin(if stdin_data.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| command.spawn_error(e))?;

    let started_at = Utc::now();
    let clock = Instant::now();

    // stdin is written while wait_with_output drains stdout and stderr
    let writer = match (child.stdin.take(), stdin_data) {
        (Some(mut stdin), Some(data)) => {
            let data = data.to_vec();
            Some(tokio::spawn(async move {
                let result = stdin.write_all(&data).await;
                drop(stdin);
                result
            }))
        }
        _ => None,
    };

    let output = child.wait_with_output().await?;
    let elapsed = clock.elapsed();

    if let Some(writer) = writer {
        match writer.await {
            Ok(Err(e)) if e.kind() != std::io::ErrorKind::BrokenPipe => {
                warn!(error = %e, "failed to write stdin");
            }
            Err(e) => warn!(error = %e, "stdin writer task failed"),
            _ => {}
        }
    }

    let result = ExecutionResult {
        stage,
        exit_code: output.status.code(),
        signal: exit_signal(&output.status),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        started_at,
        elapsed,
        message: None,
    };

    debug!(
        ?stage,
        exit_code = ?result.exit_code,
        signal = ?result.signal,
        elapsed_ms = elapsed.as_millis() as u64,
        "process finished"
    );

    Ok(result)
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

/// Handle to a detached, long-running process
///
/// Standard output and error are piped but never read; standard input is closed.
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
    argv: Vec<String>,
}

impl ServerProcess {
    /// Spawn the command in the background
    #[instrument(skip(command), fields(argv = ?command.argv()))]
    pub fn spawn(command: &ProcessCommand) -> Result<Self, ProcessError> {
        let child = command
            .build()?
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command.spawn_error(e))?;

        debug!(pid = ?child.id(), "spawned background process");

        Ok(Self {
            child,
            argv: command.argv().to_vec(),
        })
    }

    /// OS process id, if the process has not been reaped yet
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// The command line this process was started with
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Send a kill signal without waiting for the process to exit
    pub fn terminate(&mut self) -> Result<(), ProcessError> {
        self.child.start_kill()?;
        Ok(())
    }

    /// Check whether the process has exited, without blocking
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, ProcessError> {
        Ok(self.child.try_wait()?)
    }

    /// Wait for the process to exit
    pub async fn wait(&mut self) -> Result<ExitStatus, ProcessError> {
        Ok(self.child.wait().await?)
    }
}

/// Whether a directory exists at `path`
pub(crate) async fn dir_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
