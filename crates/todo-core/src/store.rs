//! Task storage.
//!
//! [`TaskStore`] is the seam handlers depend on. [`InMemoryTaskStore`] is the
//! only backing today; a persistent variant only has to implement the trait.
//!
//! The in-memory store keeps tasks in insertion order and guards the sequence
//! with a single `RwLock`. Each trait method takes the lock once, so every
//! operation is atomic with respect to the others.

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::errors::{Result, StoreError};
use crate::task::{Task, TaskId};

/// Storage capability set for todo records.
pub trait TaskStore: Send + Sync {
    /// Append a task and return it unchanged. Does not check for id collisions.
    fn add_task(&self, task: Task) -> Task;

    /// Append a task only if no stored task has the same id.
    fn try_add_task(&self, task: Task) -> Result<Task>;

    /// Look up the single task with `id`.
    ///
    /// Returns `Ok(None)` when nothing matches and
    /// [`StoreError::Multiplicity`] when more than one record does.
    fn get_task_by_id(&self, id: TaskId) -> Result<Option<Task>>;

    /// Snapshot of every task in insertion order.
    fn get_all_tasks(&self) -> Vec<Task>;

    /// Remove every task with `id`, returning how many were removed.
    fn delete_task_by_id(&self, id: TaskId) -> usize;

    /// Number of stored tasks.
    fn len(&self) -> usize;

    /// Whether the store holds no tasks.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered, lock-guarded task store living for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn add_task(&self, task: Task) -> Task {
        let mut tasks = self.tasks.write();
        tasks.push(task.clone());
        debug!(id = task.id, total = tasks.len(), "task added");
        task
    }

    fn try_add_task(&self, task: Task) -> Result<Task> {
        let mut tasks = self.tasks.write();
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::DuplicateId(task.id));
        }
        tasks.push(task.clone());
        debug!(id = task.id, total = tasks.len(), "task added");
        Ok(task)
    }

    fn get_task_by_id(&self, id: TaskId) -> Result<Option<Task>> {
        let tasks = self.tasks.read();
        let mut matches = tasks.iter().filter(|t| t.id == id);
        let Some(first) = matches.next() else {
            return Ok(None);
        };
        let extra = matches.count();
        if extra > 0 {
            let count = extra + 1;
            warn!(id, count, "duplicate task id on lookup");
            return Err(StoreError::Multiplicity { id, count });
        }
        Ok(Some(first.clone()))
    }

    fn get_all_tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }

    fn delete_task_by_id(&self, id: TaskId) -> usize {
        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        let removed = before - tasks.len();
        debug!(id, removed, "tasks deleted");
        removed
    }

    fn len(&self) -> usize {
        self.tasks.read().len()
    }
}
