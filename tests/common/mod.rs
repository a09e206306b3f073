//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use smokeping_operator::adapters::renderer::TemplateRenderer;
use smokeping_operator::adapters::status::FileStatusReporter;
use smokeping_operator::adapters::workload::LocalWorkload;
use smokeping_operator::domain::models::WorkloadSettings;
use smokeping_operator::services::ReconciliationController;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Workload settings rooted at `root`, running `command` instead of the
/// real Smokeping binary and skipping the ownership change.
pub fn local_settings(root: &Path, command: &str) -> WorkloadSettings {
    WorkloadSettings {
        root: root.to_path_buf(),
        command: command.to_string(),
        cache_owner: None,
        cache_group: None,
        stop_timeout_secs: 5,
        ..WorkloadSettings::default()
    }
}

/// A controller wired to the local adapters under `base`.
///
/// Returns the controller, the workload root and the status file path.
pub fn local_controller(base: &Path, command: &str) -> (ReconciliationController, PathBuf, PathBuf) {
    let root = base.join("workload");
    std::fs::create_dir_all(&root).expect("Failed to create workload root");
    let status_path = base.join("status.json");

    let settings = local_settings(&root, command);
    let controller = ReconciliationController::new(
        Arc::new(TemplateRenderer::default()),
        Arc::new(LocalWorkload::from_settings(&settings)),
        Arc::new(FileStatusReporter::new(status_path.clone())),
        settings,
    );
    (controller, root, status_path)
}

/// Read the pid the local supervisor recorded for `service`.
pub fn recorded_pid(root: &Path, service: &str) -> Option<i32> {
    std::fs::read_to_string(root.join(".supervisor").join(format!("{service}.pid")))
        .ok()?
        .trim()
        .parse()
        .ok()
}
