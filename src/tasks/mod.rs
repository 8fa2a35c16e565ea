pub mod helpers;
pub mod persistence;
pub mod reorder;
pub mod store;
pub mod types;

pub use reorder::{GestureOutcome, ReorderCoordinator};
pub use store::TaskStore;
pub use types::{OrderError, Outcome, Task, TaskError, TaskEvent, TaskId};
