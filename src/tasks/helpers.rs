use super::types::{OrderError, Task, TaskId};
use std::collections::HashSet;

pub fn find_index(tasks: &[Task], id: TaskId) -> Option<usize> {
    tasks.iter().position(|task| task.id == id)
}

/// Sets each task's position to its index.
pub fn renumber(tasks: &mut [Task]) {
    for (index, task) in tasks.iter_mut().enumerate() {
        task.position = index as u32;
    }
}

/// Checks that `order` is a permutation of the ids in `tasks`.
pub fn validate_order(tasks: &[Task], order: &[TaskId]) -> Result<(), OrderError> {
    let known: HashSet<TaskId> = tasks.iter().map(|task| task.id).collect();
    let mut seen = HashSet::with_capacity(order.len());

    for id in order {
        if !known.contains(id) {
            return Err(OrderError::Unknown(*id));
        }
        if !seen.insert(*id) {
            return Err(OrderError::Duplicate(*id));
        }
    }

    if order.len() != tasks.len() {
        return Err(OrderError::LengthMismatch {
            expected: tasks.len(),
            got: order.len(),
        });
    }

    Ok(())
}
