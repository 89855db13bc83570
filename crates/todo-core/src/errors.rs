//! Task store error types.

use thiserror::Error;

use crate::task::TaskId;

/// Errors raised by a [`TaskStore`](crate::store::TaskStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A lookup expected one record but found several with the same id.
    #[error("expected at most one task with id {id}, found {count}")]
    Multiplicity {
        /// The id that was looked up.
        id: TaskId,
        /// How many records matched.
        count: usize,
    },
    /// An insert was refused because the id is already taken.
    #[error("a task with id {0} already exists")]
    DuplicateId(TaskId),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
