//! Execution orchestrator
//!
//! A [`Session`] ties the workspace, toolchain runner, dev server slot and
//! run history together behind a single `run` entry point.

use std::process::ExitStatus;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::{Config, Language, WebFramework};
use crate::history::{History, HistoryEntry};
use crate::runner::{CompileAndRunError, Runner};
use crate::server::{ServerError, ServerHandle, ServerManager};
use crate::types::ExecutionResult;
use crate::workspace::{Workspace, WorkspaceError};

/// Errors that abort a session request
///
/// Compile and runtime failures are not errors; they come back as
/// [`ExecutionResult`]s.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error(transparent)]
    Run(#[from] CompileAndRunError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// How a submission is executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Compile if needed, run to completion with `stdin` as input
    Batch { stdin: String },
    /// Launch the framework's dev server in the background
    Server {
        framework: WebFramework,
        /// Project for scaffolding frameworks; the configured default when `None`
        project: Option<String>,
    },
}

/// A single submission
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub language: Language,
    pub source: String,
    pub mode: RunMode,
}

impl RunRequest {
    pub fn batch(language: Language, source: impl Into<String>, stdin: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
            mode: RunMode::Batch {
                stdin: stdin.into(),
            },
        }
    }

    pub fn server(
        language: Language,
        source: impl Into<String>,
        framework: WebFramework,
        project: Option<String>,
    ) -> Self {
        Self {
            language,
            source: source.into(),
            mode: RunMode::Server { framework, project },
        }
    }
}

/// Serves one request at a time against a workspace
#[derive(Debug)]
pub struct Session {
    runner: Runner,
    workspace: Workspace,
    servers: ServerManager,
    history: History,
    last_stamp: Option<DateTime<Utc>>,
}

impl Session {
    /// Open the configured workspace and start with an empty history
    pub async fn open(config: Config) -> Result<Self, SessionError> {
        let workspace = Workspace::open(&config).await?;
        Ok(Self {
            runner: Runner::new(config.clone()),
            workspace,
            servers: ServerManager::new(config),
            history: History::new(),
            last_stamp: None,
        })
    }

    pub fn config(&self) -> &Config {
        self.runner.config()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Execute a submission and record it in the history.
    ///
    /// Any running dev server is stopped first. Requests that fail with an
    /// error leave the history untouched.
    #[instrument(skip(self, request), fields(language = %request.language))]
    pub async fn run(&mut self, request: RunRequest) -> Result<ExecutionResult, SessionError> {
        if let Some(previous) = self.servers.stop() {
            debug!(framework = %previous.framework(), "stopped server before new run");
        }

        let result = match &request.mode {
            RunMode::Batch { stdin } => {
                self.runner
                    .execute(&self.workspace, request.language, &request.source, stdin)
                    .await?
            }
            RunMode::Server { framework, project } => {
                let source_path = self.workspace.write(request.language, &request.source).await?;
                let handle = self
                    .servers
                    .start(&self.workspace, *framework, project.as_deref(), &source_path)
                    .await?;
                ExecutionResult::server_started(format!(
                    "{framework} server running at {}",
                    handle.url()
                ))
            }
        };

        let recorded_at = self.next_stamp();
        self.history.record(HistoryEntry {
            recorded_at,
            language: request.language,
            source: request.source,
            result: result.clone(),
        });
        info!(stage = ?result.stage, exit_code = ?result.exit_code, "run recorded");

        Ok(result)
    }

    /// Stop the dev server, if one is running
    pub fn stop_server(&mut self) -> Option<ServerHandle> {
        self.servers.stop()
    }

    pub fn active_server(&self) -> Option<&ServerHandle> {
        self.servers.active()
    }

    /// Clear the server slot if the server already exited; returns its status
    pub fn reap_server(&mut self) -> Result<Option<ExitStatus>, SessionError> {
        Ok(self.servers.reap_exited()?)
    }

    /// Install a framework's packages
    pub async fn install(&self, framework: WebFramework) -> Result<ExecutionResult, SessionError> {
        Ok(self.servers.install(framework).await?)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current time, nudged forward so keys never repeat or go backwards
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_stamp
            && now <= last
        {
            now = last + TimeDelta::nanoseconds(1);
        }
        self.last_stamp = Some(now);
        now
    }
}
