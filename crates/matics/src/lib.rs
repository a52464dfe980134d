//! A library for running editor submissions with local toolchains.
//!
//! Matics writes each submission to a canonical file in a workspace
//! directory, compiles it when the language needs it, runs it with batch I/O,
//! and can launch a web framework's dev server in the background.
//!
//! # Features
//!
//! - **Multi-language** — Python, Java, C and C++ out of the box.
//! - **TOML configuration** — Per-language compiler/runtime commands and per-framework launch commands.
//! - **Stale output protection** — Compiled outputs are removed before every build.
//! - **Dev servers** — At most one Django, Flask or Streamlit server at a time.
//! - **History** — Every run is recorded with its source and result.

pub use config::{Config, ConfigError, EXAMPLE_CONFIG, Language, WebFramework};
pub use history::{History, HistoryEntry};
pub use process::ProcessError;
pub use runner::{
    CompileAndRunError, CompileAndRunRequest, CompileError, CompileResult, ExecuteError, Runner,
};
pub use server::{Scaffold, ServerError, ServerHandle, ServerManager};
pub use session::{RunMode, RunRequest, Session, SessionError};
pub use types::{ExecutionResult, ExecutionStage};
pub use workspace::{Workspace, WorkspaceError};

pub mod config;
pub mod history;
pub mod process;
pub mod runner;
pub mod server;
pub mod session;
pub mod types;
pub mod workspace;
