//! Shared test infrastructure for task-cli integration tests.
//!
//! Provides TestEnv helper for consistent test setup/teardown.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use task_cli::{Config, Repository, Status, StoreError, Task};
use tempfile::TempDir;

/// Test environment with automatic cleanup.
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub repo: Repository,
}

impl TestEnv {
    /// Create a new test environment with an empty store.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Repository::open(&Config::new(temp_dir.path().join("tasks.json"))).expect("Failed to open store");
        Self { temp_dir, repo }
    }

    /// Create a test environment whose store file starts with `contents`.
    pub fn with_file_contents(contents: impl AsRef<[u8]>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("tasks.json");
        fs::write(&path, contents).expect("Failed to seed store file");
        let repo = Repository::open(&Config::new(&path)).expect("Failed to open store");
        Self { temp_dir, repo }
    }

    /// Path of the store file.
    pub fn store_path(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    /// Create a task and return its id.
    pub fn create_task(&mut self, description: &str) -> u64 {
        self.repo.create(description).expect("Failed to create task")
    }

    /// Open a second repository on the same file, as a new invocation would.
    pub fn reopen(&self) -> Repository {
        Repository::open(&Config::new(self.store_path())).expect("Failed to reopen store")
    }

    /// Raw bytes of the store file (empty if it does not exist).
    pub fn file_bytes(&self) -> Vec<u8> {
        fs::read(self.store_path()).unwrap_or_default()
    }

    /// Tasks currently persisted on disk.
    pub fn persisted(&self) -> Vec<Task> {
        self.reopen().list().to_vec()
    }

    /// Ids with the given status, in listing order.
    pub fn ids_with_status(&self, status: Status) -> Vec<u64> {
        self.repo.list_by_status(status).iter().map(|t| t.id).collect()
    }

    /// Get a task that must exist.
    pub fn task(&self, id: u64) -> Task {
        self.repo.find(id).cloned().unwrap_or_else(|| panic!("Expected task {} to exist", id))
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// The typed store error inside a report.
pub fn store_error(report: &eyre::Report) -> &StoreError {
    report
        .downcast_ref::<StoreError>()
        .unwrap_or_else(|| panic!("Expected a StoreError, got: {:#}", report))
}
