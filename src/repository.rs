//! High-level repository API: the in-memory task list and its mutations.

use crate::config::Config;
use crate::id::next_id;
use crate::storage::Storage;
use crate::types::{Status, Task, ValidationError, now, validate_description};
use eyre::Result;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during repository operations.
#[derive(Debug)]
pub enum StoreError {
    /// Task not found.
    TaskNotFound(u64),
    /// Validation error.
    Validation(ValidationError),
    /// The status table does not allow this change.
    InvalidStatusTransition { from: Status, to: Status },
    /// Store file exists but does not decode.
    CorruptStore { path: PathBuf, reason: String },
    /// Store file exists but cannot be read.
    StoreRead { path: PathBuf, source: io::Error },
    /// Writing the store failed; the previous content is intact.
    StoreWrite { path: PathBuf, source: io::Error },
    /// No id left above the current maximum.
    IdSpaceExhausted,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::TaskNotFound(id) => write!(f, "task not found: {}", id),
            StoreError::Validation(e) => write!(f, "validation error: {}", e),
            StoreError::InvalidStatusTransition { from, to } => {
                write!(f, "invalid status transition from {} to {}", from, to)
            }
            StoreError::CorruptStore { path, reason } => {
                write!(f, "corrupt task store {}: {}", path.display(), reason)
            }
            StoreError::StoreRead { path, .. } => write!(f, "failed to read task store {}", path.display()),
            StoreError::StoreWrite { path, .. } => write!(f, "failed to write task store {}", path.display()),
            StoreError::IdSpaceExhausted => write!(f, "no task ids left"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::StoreRead { source, .. } | StoreError::StoreWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The task repository.
///
/// Holds the full task list in memory. Every mutating call writes the whole
/// list back through [`Storage`]; if that write fails the in-memory list is
/// left as it was.
pub struct Repository {
    storage: Storage,
    tasks: Vec<Task>,
    recovered: Option<String>,
}

impl Repository {
    /// Open the store named by `config`.
    ///
    /// A corrupt store is recovered as empty: the file is copied aside, a
    /// warning is logged, and [`Repository::recovered_from_corruption`]
    /// reports what happened.
    pub fn open(config: &Config) -> Result<Self> {
        let storage = Storage::new(&config.file);

        let (tasks, recovered) = match storage.load() {
            Ok(tasks) => (tasks, None),
            Err(report) => match report.downcast_ref::<StoreError>() {
                Some(corrupt @ StoreError::CorruptStore { .. }) => {
                    let mut diagnostic = corrupt.to_string();
                    match storage.quarantine() {
                        Ok(copy) => diagnostic.push_str(&format!(" (copy saved to {})", copy.display())),
                        Err(e) => log::warn!("Failed to keep a copy of the corrupt store: {}", e),
                    }
                    log::warn!("{}; continuing with no tasks", diagnostic);
                    (Vec::new(), Some(diagnostic))
                }
                _ => return Err(report),
            },
        };

        Ok(Self {
            storage,
            tasks,
            recovered,
        })
    }

    /// Diagnostic for a corrupt store that was replaced by an empty one.
    pub fn recovered_from_corruption(&self) -> Option<&str> {
        self.recovered.as_deref()
    }

    /// Path of the backing store file.
    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// Create a new task and return its id.
    pub fn create(&mut self, description: &str) -> Result<u64> {
        validate_description(description).map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        let id = next_id(&self.tasks).ok_or_else(|| eyre::eyre!(StoreError::IdSpaceExhausted))?;
        let task = Task::new(id, description, now());

        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next)?;

        log::info!("Created task {}", id);
        Ok(id)
    }

    /// Find a task by id.
    pub fn find(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Get a task by id, failing if it does not exist.
    pub fn get(&self, id: u64) -> Result<&Task> {
        self.find(id).ok_or_else(|| eyre::eyre!(StoreError::TaskNotFound(id)))
    }

    /// Replace a task's description.
    pub fn update(&mut self, id: u64, description: &str) -> Result<Task> {
        validate_description(description).map_err(|e| eyre::eyre!(StoreError::Validation(e)))?;

        let updated = self.modify(id, |task| {
            task.description = description.to_string();
        })?;

        log::info!("Updated description of task {}", id);
        Ok(updated)
    }

    /// Delete a task. Returns whether anything was removed.
    ///
    /// Deleting an absent id succeeds without touching the store.
    pub fn delete(&mut self, id: u64) -> Result<bool> {
        if self.find(id).is_none() {
            log::debug!("Delete of absent task {} is a no-op", id);
            return Ok(false);
        }

        let next: Vec<Task> = self.tasks.iter().filter(|t| t.id != id).cloned().collect();
        self.commit(next)?;

        log::info!("Deleted task {}", id);
        Ok(true)
    }

    /// All tasks, in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks with the given status, in insertion order.
    pub fn list_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True if the store holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Apply `change` to task `id`, refresh its `updatedAt`, and persist.
    ///
    /// Fails with [`StoreError::TaskNotFound`] before any write.
    pub(crate) fn modify(&mut self, id: u64, change: impl FnOnce(&mut Task)) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| eyre::eyre!(StoreError::TaskNotFound(id)))?;

        let mut next = self.tasks.clone();
        let task = &mut next[index];
        change(task);
        task.touch(now());
        let updated = task.clone();

        self.commit(next)?;
        Ok(updated)
    }

    /// Persist `next` and adopt it as the current list.
    fn commit(&mut self, next: Vec<Task>) -> Result<()> {
        self.storage.save(&next)?;
        self.tasks = next;
        Ok(())
    }
}
