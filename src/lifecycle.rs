//! Status transitions for tasks.
//!
//! Any status may move to any other. Every transition refreshes the task's
//! `updatedAt` and is persisted before it returns.

use crate::repository::{Repository, StoreError};
use crate::types::{Status, Task};
use eyre::Result;

/// Extension trait for status changes on Repository.
pub trait RepositoryLifecycleExt {
    /// Set a task's status.
    fn set_status(&mut self, id: u64, status: Status) -> Result<Task>;

    /// Mark a task as in progress.
    fn start(&mut self, id: u64) -> Result<Task> {
        self.set_status(id, Status::InProgress)
    }

    /// Mark a task as done.
    fn complete(&mut self, id: u64) -> Result<Task> {
        self.set_status(id, Status::Done)
    }

    /// Move a task back to TODO.
    fn reopen(&mut self, id: u64) -> Result<Task> {
        self.set_status(id, Status::Todo)
    }
}

impl RepositoryLifecycleExt for Repository {
    fn set_status(&mut self, id: u64, status: Status) -> Result<Task> {
        let current = self.get(id)?.status;
        check_transition(current, status)?;

        let updated = self.modify(id, |task| task.status = status)?;
        log::info!("Task {} status {} -> {}", id, current, status);
        Ok(updated)
    }
}

/// Fail with [`StoreError::InvalidStatusTransition`] unless `from` may move to `to`.
fn check_transition(from: Status, to: Status) -> Result<()> {
    if !from.can_transition_to(&to) {
        return Err(eyre::eyre!(StoreError::InvalidStatusTransition { from, to }));
    }
    Ok(())
}

/// True if `report` is a missing-task failure.
pub fn is_not_found(report: &eyre::Report) -> bool {
    matches!(report.downcast_ref::<StoreError>(), Some(StoreError::TaskNotFound(_)))
}
