//! Drag-and-drop reordering.
//!
//! The presentation layer moves items around a visual list while the user
//! drags. [`ReorderCoordinator`] keeps that visual order to itself and only
//! touches the [`TaskStore`] once, when the gesture ends with a real drop.

use super::store::TaskStore;
use super::types::{Outcome, TaskError, TaskId};
use crate::storage::KeyValueStore;

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// `finish` was called with no gesture in progress.
    NoGesture,
    /// The item was released outside any drop target.
    NoDrop,
    /// Dropped, but the order is what it was at pick-up.
    Unchanged,
    /// The new order was committed to the store.
    Reordered,
}

#[derive(Debug, Clone)]
struct Gesture {
    dragged: TaskId,
    initial: Vec<TaskId>,
    visual: Vec<TaskId>,
    dropped: bool,
}

#[derive(Debug, Default)]
pub struct ReorderCoordinator {
    gesture: Option<Gesture>,
}

impl ReorderCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up `dragged`. Returns `false` (and starts nothing) if the task
    /// does not exist. An unfinished earlier gesture is abandoned.
    pub fn start<S: KeyValueStore>(&mut self, store: &TaskStore<S>, dragged: TaskId) -> bool {
        if self.gesture.take().is_some() {
            tracing::debug!(target: "tasks::reorder", "Abandoning unfinished gesture");
        }

        if !store.contains(dragged) {
            tracing::debug!(target: "tasks::reorder", id = %dragged, "Drag start ignored, task not found");
            return false;
        }

        let order = store.ids();
        self.gesture = Some(Gesture {
            dragged,
            initial: order.clone(),
            visual: order,
            dropped: false,
        });

        tracing::trace!(target: "tasks::reorder", id = %dragged, "Gesture started");
        true
    }

    /// Drops the dragged item on `target`. Moving down places it after the
    /// target, moving up places it before. Returns `false` when there is no
    /// gesture or `target` is not in the list.
    pub fn drop_on(&mut self, target: TaskId) -> bool {
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };

        let Some(to) = gesture.visual.iter().position(|id| *id == target) else {
            tracing::debug!(target: "tasks::reorder", id = %target, "Drop ignored, unknown target");
            return false;
        };
        let Some(from) = gesture.visual.iter().position(|id| *id == gesture.dragged) else {
            return false;
        };

        if from != to {
            let moved = gesture.visual.remove(from);
            gesture.visual.insert(to, moved);
        }
        gesture.dropped = true;

        tracing::trace!(target: "tasks::reorder", from, to, "Dropped");
        true
    }

    /// Abandons the gesture without touching the store.
    pub fn cancel(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            tracing::debug!(target: "tasks::reorder", id = %gesture.dragged, "Gesture cancelled");
        }
    }

    /// Ends the gesture and, if a drop changed the order, submits it to the
    /// store as a single reorder.
    pub fn finish<S: KeyValueStore>(
        &mut self,
        store: &mut TaskStore<S>,
    ) -> Result<Outcome<GestureOutcome>, TaskError> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(Outcome::ok(GestureOutcome::NoGesture));
        };

        if !gesture.dropped {
            tracing::debug!(target: "tasks::reorder", id = %gesture.dragged, "Gesture ended without drop");
            return Ok(Outcome::ok(GestureOutcome::NoDrop));
        }

        if gesture.visual == gesture.initial {
            return Ok(Outcome::ok(GestureOutcome::Unchanged));
        }

        let outcome = store.reorder(&gesture.visual)?;
        tracing::debug!(target: "tasks::reorder", id = %gesture.dragged, "Gesture committed");
        Ok(outcome.map(|()| GestureOutcome::Reordered))
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn dragged(&self) -> Option<TaskId> {
        self.gesture.as_ref().map(|g| g.dragged)
    }

    /// The order the presentation layer should show while dragging.
    pub fn visual_order(&self) -> Option<&[TaskId]> {
        self.gesture.as_ref().map(|g| g.visual.as_slice())
    }
}
