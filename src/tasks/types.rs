pub use crate::shared::outcome::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Creation-time derived identifier (milliseconds since the Unix epoch,
/// bumped when two tasks are created within the same millisecond).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        TaskId(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub position: u32,
}

/// A task as found in storage. Entries written before ordering existed have
/// no `position`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredTask {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub position: Option<u32>,
}

/// Change notification emitted after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Created(Task),
    Updated(Task),
    Removed(Task),
    Reordered(Vec<TaskId>),
}

/// Why a proposed order is not a permutation of the current ids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("expected {expected} ids, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("task {0} appears more than once")]
    Duplicate(TaskId),
    #[error("task {0} does not exist")]
    Unknown(TaskId),
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] OrderError),
}
