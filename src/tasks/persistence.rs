use super::types::{StoredTask, Task};
use crate::shared::errors::StorageError;
use crate::storage::KeyValueStore;
use std::collections::HashSet;

/// Storage key holding the JSON array of tasks.
pub const TASKS_KEY: &str = "tasks";

/// Copy of the last stored value that could not be read in full.
pub const TASKS_BACKUP_KEY: &str = "tasks_backup";

/// What had to be fixed while loading stored tasks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RepairReport {
    /// Entries without a `position`, placed at their stored index.
    pub missing_positions: usize,
    /// Later entries sharing an id with an earlier one, dropped.
    pub duplicate_ids: usize,
    /// Positions that changed when compacting to `0..n`.
    pub renumbered: usize,
    /// Entries that could not be parsed as a task, dropped.
    pub skipped: usize,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.missing_positions == 0
            && self.duplicate_ids == 0
            && self.renumbered == 0
            && self.skipped == 0
    }

    /// Whether the next write would lose stored data.
    pub fn is_lossy(&self) -> bool {
        self.skipped > 0
    }
}

/// Reads the task list, returning an empty list when nothing was stored.
pub fn read_tasks(
    storage: &dyn KeyValueStore,
) -> Result<(Vec<Task>, RepairReport), StorageError> {
    match storage.get(TASKS_KEY)? {
        Some(content) if !content.trim().is_empty() => decode_tasks(&content),
        _ => Ok((Vec::new(), RepairReport::default())),
    }
}

/// Copies the raw stored task list to [`TASKS_BACKUP_KEY`] so the next write
/// cannot destroy entries that failed to load. Returns `false` when nothing
/// was stored.
pub fn backup_tasks(storage: &mut dyn KeyValueStore) -> Result<bool, StorageError> {
    let Some(content) = storage.get(TASKS_KEY)? else {
        return Ok(false);
    };
    storage.set(TASKS_BACKUP_KEY, &content)?;
    tracing::info!(target: "tasks", bytes = content.len(), "Backed up stored tasks");
    Ok(true)
}

/// Writes the full task list. Callers pass tasks in position order.
pub fn write_tasks(storage: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<(), StorageError> {
    let content = serde_json::to_string(tasks)?;
    storage.set(TASKS_KEY, &content)
}

/// Parses stored tasks and restores the dense-position invariant.
///
/// Legacy entries with no `position` take their index in the stored array.
/// The list is then ordered by position (stored index breaks ties) and
/// renumbered `0..n`, so damaged positions never reach the store.
///
/// Entries that do not parse as a task are skipped and counted; only a value
/// that is not a JSON array at all is an error.
pub fn decode_tasks(content: &str) -> Result<(Vec<Task>, RepairReport), StorageError> {
    let stored: Vec<serde_json::Value> = serde_json::from_str(content)?;
    let mut report = RepairReport::default();

    let mut seen = HashSet::with_capacity(stored.len());
    let mut entries: Vec<(u32, usize, StoredTask)> = Vec::with_capacity(stored.len());

    for (index, value) in stored.into_iter().enumerate() {
        let entry: StoredTask = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                report.skipped += 1;
                tracing::warn!(target: "tasks", index, "Skipping unreadable stored task: {}", e);
                continue;
            }
        };

        if !seen.insert(entry.id) {
            report.duplicate_ids += 1;
            tracing::warn!(target: "tasks", id = %entry.id, "Dropping stored task with duplicate id");
            continue;
        }

        let position = match entry.position {
            Some(position) => position,
            None => {
                report.missing_positions += 1;
                u32::try_from(index).unwrap_or(u32::MAX)
            }
        };
        entries.push((position, index, entry));
    }

    entries.sort_by_key(|(position, index, _)| (*position, *index));

    let tasks = entries
        .into_iter()
        .enumerate()
        .map(|(rank, (position, _, entry))| {
            let rank = rank as u32;
            if rank != position {
                report.renumbered += 1;
            }
            Task {
                id: entry.id,
                text: entry.text,
                completed: entry.completed,
                position: rank,
            }
        })
        .collect();

    Ok((tasks, report))
}
