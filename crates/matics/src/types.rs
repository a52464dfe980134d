use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Step of a submission that produced an [`ExecutionResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStage {
    /// Compiler invocation
    Compile,
    /// Program (or interpreter) invocation
    Run,
    /// Long-running dev server launch
    Server,
}

/// Result of an execution
///
/// Standard output and standard error are kept apart; use
/// [`console_output`](Self::console_output) for the single-pane view.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Which step produced this result
    pub stage: ExecutionStage,

    /// Exit code if the process exited normally
    pub exit_code: Option<i32>,

    /// Signal number if the process was killed by a signal
    pub signal: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// When the process was started
    pub started_at: DateTime<Utc>,

    /// Wall clock time until the process exited
    pub elapsed: Duration,

    /// Additional message (e.g., where a started server listens)
    pub message: Option<String>,
}

impl ExecutionResult {
    /// Synthesized result for a server that was launched in the background
    pub fn server_started(message: impl Into<String>) -> Self {
        Self {
            stage: ExecutionStage::Server,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Check if the process exited with code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Whether this result comes from a failed compile step
    #[must_use]
    pub fn is_compile_failure(&self) -> bool {
        self.stage == ExecutionStage::Compile && !self.is_success()
    }

    /// Text for a single console pane: stdout if non-empty, else stderr.
    ///
    /// An empty string does not imply success; check
    /// [`exit_code`](Self::exit_code) as well.
    pub fn console_output(&self) -> &str {
        if !self.stdout.is_empty() {
            &self.stdout
        } else if !self.stderr.is_empty() {
            &self.stderr
        } else {
            self.message.as_deref().unwrap_or("")
        }
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            stage: ExecutionStage::Run,
            exit_code: None,
            signal: None,
            stdout: String::new(),
            stderr: String::new(),
            started_at: Utc::now(),
            elapsed: Duration::ZERO,
            message: None,
        }
    }
}
