//! task-cli: a command-line task tracker backed by a single JSON file.
//!
//! Each invocation loads the whole store, applies one change in memory, and
//! rewrites the file atomically.
//!
//! # Example
//!
//! ```no_run
//! use task_cli::{Config, Repository, RepositoryLifecycleExt, Status};
//!
//! let mut repo = Repository::open(&Config::new("tasks.json")).unwrap();
//!
//! let id = repo.create("Buy milk").unwrap();
//! repo.start(id).unwrap();
//!
//! let in_progress = repo.list_by_status(Status::InProgress);
//! assert_eq!(in_progress.len(), 1);
//!
//! repo.complete(id).unwrap();
//! repo.delete(id).unwrap();
//! ```

mod id;
mod storage;
mod types;

pub mod config;
pub mod lifecycle;
pub mod repository;

// Re-export public API
pub use config::Config;
pub use lifecycle::{RepositoryLifecycleExt, is_not_found};
pub use repository::{Repository, StoreError};
pub use storage::Storage;
pub use types::{Status, Task, ValidationError, parse_id};
