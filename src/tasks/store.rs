use super::helpers::{find_index, renumber, validate_order};
use super::persistence::{backup_tasks, read_tasks, write_tasks};
use super::types::{Outcome, Task, TaskError, TaskEvent, TaskId};
use crate::shared::errors::StorageError;
use crate::storage::KeyValueStore;
use std::collections::HashMap;

type Listener = Box<dyn FnMut(&TaskEvent)>;

/// Hands out strictly increasing, time-derived ids.
#[derive(Debug, Default)]
struct IdClock {
    last: i64,
}

impl IdClock {
    fn seeded(tasks: &[Task]) -> Self {
        Self {
            last: tasks.iter().map(|t| t.id.0).max().unwrap_or(0),
        }
    }

    fn next(&mut self) -> TaskId {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last.saturating_add(1));
        TaskId(self.last)
    }
}

/// Owner of the task list. Every mutation is followed by a full write of the
/// list to storage; the in-memory list stays authoritative if that write
/// fails.
///
/// Tasks are kept sorted so that `tasks[i].position == i`.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    storage: S,
    clock: IdClock,
    listeners: Vec<Listener>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// An empty store. Nothing is read from `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            tasks: Vec::new(),
            storage,
            clock: IdClock::default(),
            listeners: Vec::new(),
        }
    }

    /// Loads the task list from `storage`.
    ///
    /// Unreadable data yields an empty store and the error as a warning.
    /// Whenever stored entries cannot be kept, the raw value is first copied
    /// to [`TASKS_BACKUP_KEY`](super::persistence::TASKS_BACKUP_KEY) so later
    /// writes do not destroy it.
    pub fn load(mut storage: S) -> Outcome<Self> {
        let (tasks, lossy, warning) = match read_tasks(&storage) {
            Ok((tasks, report)) => {
                if !report.is_clean() {
                    tracing::info!(
                        target: "tasks",
                        missing_positions = report.missing_positions,
                        duplicate_ids = report.duplicate_ids,
                        renumbered = report.renumbered,
                        skipped = report.skipped,
                        "Repaired stored task order"
                    );
                }
                (tasks, report.is_lossy(), None)
            }
            Err(e) => {
                tracing::warn!(target: "tasks", "Could not load tasks, starting empty: {}", e);
                let lossy = matches!(e, StorageError::Parse(_));
                (Vec::new(), lossy, Some(e))
            }
        };

        if lossy {
            if let Err(e) = backup_tasks(&mut storage) {
                tracing::warn!(target: "tasks", "Failed to back up stored tasks: {}", e);
            }
        }

        tracing::info!(target: "tasks", count = tasks.len(), "Task store loaded");

        let store = Self {
            clock: IdClock::seeded(&tasks),
            tasks,
            storage,
            listeners: Vec::new(),
        };
        Outcome::with_warning(store, warning)
    }

    /// Writes the full list to storage.
    pub fn save(&mut self) -> Result<(), StorageError> {
        write_tasks(&mut self.storage, &self.tasks)
    }

    /// Appends a task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str) -> Outcome<Option<Task>> {
        let text = text.trim();
        if text.is_empty() {
            return Outcome::ok(None);
        }

        let task = Task {
            id: self.clock.next(),
            text: text.to_string(),
            completed: false,
            position: self.tasks.len() as u32,
        };
        self.tasks.push(task.clone());

        tracing::debug!(target: "tasks", id = %task.id, position = task.position, "Task added");

        let warning = self.persist();
        self.notify(TaskEvent::Created(task.clone()));
        Outcome::with_warning(Some(task), warning)
    }

    /// Flips completion. Returns the new state, or `None` for an unknown id.
    pub fn toggle_completed(&mut self, id: TaskId) -> Outcome<Option<bool>> {
        let Some(index) = find_index(&self.tasks, id) else {
            tracing::debug!(target: "tasks", id = %id, "Toggle ignored, task not found");
            return Outcome::ok(None);
        };

        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let updated = task.clone();

        let warning = self.persist();
        self.notify(TaskEvent::Updated(updated.clone()));
        Outcome::with_warning(Some(updated.completed), warning)
    }

    /// Removes a task and compacts the remaining positions. Returns the
    /// removed task, or `None` for an unknown id.
    pub fn delete(&mut self, id: TaskId) -> Outcome<Option<Task>> {
        let Some(index) = find_index(&self.tasks, id) else {
            tracing::debug!(target: "tasks", id = %id, "Delete ignored, task not found");
            return Outcome::ok(None);
        };

        let removed = self.tasks.remove(index);
        renumber(&mut self.tasks);

        tracing::debug!(target: "tasks", id = %id, remaining = self.tasks.len(), "Task deleted");

        let warning = self.persist();
        self.notify(TaskEvent::Removed(removed.clone()));
        Outcome::with_warning(Some(removed), warning)
    }

    /// Makes `order` the canonical order. It must contain every current id
    /// exactly once; otherwise nothing changes.
    pub fn reorder(&mut self, order: &[TaskId]) -> Result<Outcome<()>, TaskError> {
        if let Err(e) = validate_order(&self.tasks, order) {
            tracing::warn!(target: "tasks", "Rejected reorder: {}", e);
            return Err(e.into());
        }

        let mut by_id: HashMap<TaskId, Task> = std::mem::take(&mut self.tasks)
            .into_iter()
            .map(|task| (task.id, task))
            .collect();
        self.tasks = order.iter().filter_map(|id| by_id.remove(id)).collect();
        renumber(&mut self.tasks);

        tracing::debug!(target: "tasks", count = self.tasks.len(), "Tasks reordered");

        let warning = self.persist();
        self.notify(TaskEvent::Reordered(order.to_vec()));
        Ok(Outcome::with_warning((), warning))
    }

    /// Tasks in position order.
    pub fn snapshot(&self) -> &[Task] {
        &self.tasks
    }

    pub fn ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|t| t.id).collect()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        find_index(&self.tasks, id).map(|index| &self.tasks[index])
    }

    pub fn contains(&self, id: TaskId) -> bool {
        find_index(&self.tasks, id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    /// Registers a listener called after every successful mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&TaskEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) -> Option<StorageError> {
        match self.save() {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(target: "tasks", "Failed to persist tasks, keeping in-memory state: {}", e);
                Some(e)
            }
        }
    }

    fn notify(&mut self, event: TaskEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store_with(texts: &[&str]) -> TaskStore<MemoryStorage> {
        let mut store = TaskStore::new(MemoryStorage::new());
        for text in texts {
            let _ = store.add(text);
        }
        store
    }

    #[test]
    fn test_id_clock_is_strictly_increasing() {
        let mut clock = IdClock::default();
        let ids: Vec<TaskId> = (0..100).map(|_| clock.next()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_id_clock_seeded_past_future_ids() {
        let far_future = chrono::Utc::now().timestamp_millis() + 1_000_000;
        let existing = vec![Task {
            id: TaskId(far_future),
            text: "x".to_string(),
            completed: false,
            position: 0,
        }];
        let mut clock = IdClock::seeded(&existing);
        assert_eq!(clock.next(), TaskId(far_future + 1));
    }

    #[test]
    fn test_add_trims_text() {
        let mut store = store_with(&[]);
        let task = store.add("  buy milk \n").into_value().unwrap();
        assert_eq!(task.text, "buy milk");
        assert_eq!(task.position, 0);
        assert!(!task.completed);
    }

    #[test]
    fn test_blank_add_touches_nothing() {
        let mut store = store_with(&[]);
        let events = Rc::new(RefCell::new(0));
        let counter = events.clone();
        store.subscribe(move |_| *counter.borrow_mut() += 1);

        assert!(store.add("").into_value().is_none());
        assert!(store.add(" \t ").into_value().is_none());

        assert!(store.is_empty());
        assert_eq!(store.storage().get("tasks").unwrap(), None);
        assert_eq!(*events.borrow(), 0);
    }

    #[test]
    fn test_get_and_counts() {
        let mut store = store_with(&["a", "b", "c"]);
        let ids = store.ids();
        let _ = store.toggle_completed(ids[1]);

        assert_eq!(store.len(), 3);
        assert_eq!(store.completed_count(), 1);
        assert_eq!(store.get(ids[1]).map(|t| t.text.as_str()), Some("b"));
        assert!(store.contains(ids[2]));
        assert!(!store.contains(TaskId(-1)));
    }

    #[test]
    fn test_events_in_order() {
        let mut store = store_with(&[]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |event| {
            let label = match event {
                TaskEvent::Created(_) => "created",
                TaskEvent::Updated(_) => "updated",
                TaskEvent::Removed(_) => "removed",
                TaskEvent::Reordered(_) => "reordered",
            };
            sink.borrow_mut().push(label);
        });

        let a = store.add("a").into_value().unwrap();
        let b = store.add("b").into_value().unwrap();
        let _ = store.toggle_completed(a.id);
        store.reorder(&[b.id, a.id]).unwrap().into_value();
        let _ = store.delete(a.id);
        let _ = store.delete(a.id);

        assert_eq!(
            *seen.borrow(),
            vec!["created", "created", "updated", "reordered", "removed"]
        );
    }

    #[test]
    fn test_reorder_rejection_keeps_state() {
        let mut store = store_with(&["a", "b", "c"]);
        let ids = store.ids();
        let before = store.snapshot().to_vec();

        let err = store.reorder(&[ids[0], ids[0], ids[1]]).unwrap_err();
        assert!(matches!(err, TaskError::InvalidOrder(_)));
        assert_eq!(store.snapshot(), before.as_slice());
    }
}
