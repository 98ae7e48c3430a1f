//! ID assignment for new tasks.

use crate::types::Task;

/// Next id for a collection: one past the highest id in use, 1 when empty.
///
/// Returns `None` if the highest id is already `u64::MAX`. Deleting the
/// task with the highest id frees that id for the next create.
pub fn next_id(tasks: &[Task]) -> Option<u64> {
    tasks.iter().map(|t| t.id).max().unwrap_or(0).checked_add(1)
}
