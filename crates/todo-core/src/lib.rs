//! # todo-core
//!
//! Domain layer for the todo service.
//!
//! - [`Task`]: the immutable todo record and its JSON shape
//! - [`TaskStore`]: storage capability set (add, get-by-id, get-all, delete-by-id)
//! - [`InMemoryTaskStore`]: lock-guarded, insertion-ordered implementation
//! - [`validation`]: creation rules checked before a task reaches the store,
//!   against an injected [`mockable::Clock`]
//! - [`logging`]: `tracing` subscriber setup shared by binaries and tests

#![deny(unsafe_code)]

pub mod errors;
pub mod logging;
pub mod store;
pub mod task;
pub mod validation;

pub use errors::{Result, StoreError};
pub use store::{InMemoryTaskStore, TaskStore};
pub use task::{Task, TaskId};
pub use validation::{ValidationErrors, validate_new_task};
