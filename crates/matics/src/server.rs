//! Dev server lifecycle
//!
//! Starts web-framework development servers in the background and keeps at
//! most one of them alive at a time.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::{Config, ConfigError, WebFramework, expand_command};
use crate::process::{ProcessCommand, ProcessError, ServerProcess, dir_exists, run_captured};
use crate::types::{ExecutionResult, ExecutionStage};
use crate::workspace::{Workspace, WorkspaceError};

/// Errors that occur while managing dev servers
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("failed to scaffold {framework} project '{project}': {message}")]
    ScaffoldFailed {
        framework: WebFramework,
        project: String,
        message: String,
    },

    #[error("failed to launch {framework} server: {source}")]
    LaunchFailed {
        framework: WebFramework,
        #[source]
        source: ProcessError,
    },

    #[error("{0} has no install command configured")]
    NoInstallCommand(WebFramework),

    #[error("process error: {0}")]
    Process(#[from] ProcessError),
}

/// Outcome of a scaffolding request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scaffold {
    /// The project directory was created
    Created,
    /// The project directory was already there; nothing was run
    AlreadyExists,
    /// The framework does not use project directories
    NotRequired,
}

/// A running dev server
#[derive(Debug)]
pub struct ServerHandle {
    framework: WebFramework,
    port: u16,
    url: String,
    project_dir: Option<PathBuf>,
    started_at: DateTime<Utc>,
    process: ServerProcess,
}

impl ServerHandle {
    pub fn framework(&self) -> WebFramework {
        self.framework
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Where the server can be reached
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Project directory the server runs in, for scaffolded frameworks
    pub fn project_dir(&self) -> Option<&Path> {
        self.project_dir.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// OS process id, if the process has not been reaped yet
    pub fn id(&self) -> Option<u32> {
        self.process.id()
    }

    /// Check whether the server has exited, without blocking
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, ServerError> {
        Ok(self.process.try_wait()?)
    }

    /// Wait for the server process to exit
    pub async fn wait(&mut self) -> Result<ExitStatus, ServerError> {
        Ok(self.process.wait().await?)
    }

    fn terminate(&mut self) {
        if let Err(e) = self.process.terminate() {
            // Already exited processes land here too
            debug!(framework = %self.framework, error = %e, "terminate signal not delivered");
        }
    }
}

/// Owner of the single dev server slot
///
/// Starting a server replaces any running one. Dropping the manager sends a
/// kill signal to the active server.
#[derive(Debug)]
pub struct ServerManager {
    config: Config,
    active: Option<ServerHandle>,
}

impl ServerManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            active: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The running server, if any
    pub fn active(&self) -> Option<&ServerHandle> {
        self.active.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Launch `framework`'s dev server, stopping the current one first.
    ///
    /// `source_path` is the file substituted for `{source}`. Scaffolding
    /// frameworks use `project` (or the configured default project) and
    /// create it on first use.
    #[instrument(skip(self, workspace, source_path))]
    pub async fn start(
        &mut self,
        workspace: &Workspace,
        framework: WebFramework,
        project: Option<&str>,
        source_path: &Path,
    ) -> Result<&ServerHandle, ServerError> {
        if let Some(previous) = self.stop() {
            debug!(framework = %previous.framework, "replaced running server");
        }

        let fw = self.config.get_framework(framework)?;
        let project = project.unwrap_or(&self.config.default_project);

        let (working_dir, project_dir) = if fw.is_scaffolded() {
            self.scaffold(workspace, framework, project).await?;
            let dir = workspace.project_dir(project)?;
            (dir.clone(), Some(dir))
        } else {
            (workspace.root().to_path_buf(), None)
        };

        let vars = vec![
            ("source", source_path.to_string_lossy().into_owned()),
            ("port", fw.port.to_string()),
            ("project", project.to_owned()),
            (
                "project_dir",
                project_dir
                    .as_deref()
                    .map(|d| d.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
        ];
        let command = ProcessCommand::new(expand_command(&fw.command, &vars))
            .working_dir(&working_dir)
            .envs(&fw.env);

        let process = ServerProcess::spawn(&command)
            .map_err(|source| ServerError::LaunchFailed { framework, source })?;

        let handle = ServerHandle {
            framework,
            port: fw.port,
            url: fw.url(&self.config.host),
            project_dir,
            started_at: Utc::now(),
            process,
        };

        info!(%framework, url = %handle.url, pid = ?handle.id(), "server running");

        Ok(&*self.active.insert(handle))
    }

    /// Signal the running server to exit and clear the slot.
    ///
    /// Does not wait for the process to exit. Returns the signalled handle,
    /// or `None` if nothing was running.
    pub fn stop(&mut self) -> Option<ServerHandle> {
        let mut handle = self.active.take()?;
        handle.terminate();
        info!(framework = %handle.framework, "server stopped");
        Some(handle)
    }

    /// Clear the slot if the active server has already exited.
    ///
    /// Returns the exit status of a server that stopped on its own.
    pub fn reap_exited(&mut self) -> Result<Option<ExitStatus>, ServerError> {
        let Some(handle) = self.active.as_mut() else {
            return Ok(None);
        };
        let Some(status) = handle.try_wait()? else {
            return Ok(None);
        };
        warn!(framework = %handle.framework, %status, "server exited on its own");
        self.active = None;
        Ok(Some(status))
    }

    /// Create the project directory for a scaffolding framework.
    ///
    /// Does nothing if the directory already exists.
    #[instrument(skip(self, workspace))]
    pub async fn scaffold(
        &self,
        workspace: &Workspace,
        framework: WebFramework,
        project: &str,
    ) -> Result<Scaffold, ServerError> {
        let fw = self.config.get_framework(framework)?;
        let Some(ref scaffold) = fw.scaffold else {
            return Ok(Scaffold::NotRequired);
        };

        let project_dir = workspace.project_dir(project)?;
        if dir_exists(&project_dir).await {
            debug!(project_dir = %project_dir.display(), "project exists, skipping scaffold");
            return Ok(Scaffold::AlreadyExists);
        }

        let vars = vec![
            ("project", project.to_owned()),
            ("project_dir", project_dir.to_string_lossy().into_owned()),
            ("port", fw.port.to_string()),
        ];
        let command = ProcessCommand::new(expand_command(scaffold, &vars))
            .working_dir(workspace.root())
            .envs(&fw.env);

        let result = run_captured(&command, ExecutionStage::Server, None).await?;

        if !result.is_success() || !dir_exists(&project_dir).await {
            let message = match result.console_output() {
                "" => format!("scaffold exited with {:?}", result.exit_code),
                output => output.trim_end().to_owned(),
            };
            return Err(ServerError::ScaffoldFailed {
                framework,
                project: project.to_owned(),
                message,
            });
        }

        info!(%framework, project, "project created");
        Ok(Scaffold::Created)
    }

    /// Install the framework's packages using its configured command
    #[instrument(skip(self))]
    pub async fn install(&self, framework: WebFramework) -> Result<ExecutionResult, ServerError> {
        let fw = self.config.get_framework(framework)?;
        let install = fw
            .install
            .as_ref()
            .ok_or(ServerError::NoInstallCommand(framework))?;

        info!(%framework, "installing packages");
        let command = ProcessCommand::new(install.iter().cloned());
        Ok(run_captured(&command, ExecutionStage::Run, None).await?)
    }
}

impl Drop for ServerManager {
    fn drop(&mut self) {
        if let Some(handle) = self.active.as_mut() {
            warn!(
                framework = %handle.framework,
                "server manager dropped with a running server, terminating it"
            );
            handle.terminate();
        }
    }
}
