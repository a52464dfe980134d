//! Integration tests for matics
//!
//! These tests drive the real toolchains: python3, javac/java, gcc and g++
//! must be on the PATH.
//! Run with: cargo test -p matics --features toolchain-tests

#![cfg(feature = "toolchain-tests")]

use std::fs;
use std::path::Path;

use matics::config::Config;
use matics::{Runner, Workspace};

mod compilation;
mod config_loading;
mod execution;
mod session_runs;

const FIXTURES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// Helper to get fixture file content
pub(crate) fn fixture_source(name: &str) -> String {
    let path = format!("{FIXTURES_PATH}/sources/{name}");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {path}: {e}"))
}

/// Default config with its workspace moved under `dir`
pub(crate) fn test_config(dir: &Path) -> Config {
    Config::default().with_workspace_dir(dir.join("temp_files"))
}

pub(crate) async fn test_runner(dir: &Path) -> (Runner, Workspace) {
    let config = test_config(dir);
    let workspace = Workspace::open(&config)
        .await
        .expect("Failed to open workspace");
    (Runner::new(config), workspace)
}
