//! Creation-time rules for new tasks.
//!
//! Both rules are always evaluated so a caller sees every problem at once:
//!
//! | Field         | Rule                        | Message                          |
//! |---------------|-----------------------------|----------------------------------|
//! | `DueDate`     | due date earlier than now   | `Cannot have due date in past`   |
//! | `IsCompleted` | task already completed      | `Cannot add completed Todo`      |

use std::collections::BTreeMap;

use mockable::Clock;
use serde::Serialize;

use crate::task::Task;

/// Error key for the due date rule.
pub const DUE_DATE_FIELD: &str = "DueDate";
/// Error key for the completion rule.
pub const IS_COMPLETED_FIELD: &str = "IsCompleted";
/// Message for a due date in the past.
pub const DUE_DATE_IN_PAST: &str = "Cannot have due date in past";
/// Message for a task submitted as already completed.
pub const ALREADY_COMPLETED: &str = "Cannot add completed Todo";

/// Field name → messages. Serializes as a JSON object of string arrays.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    /// Empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Whether no rule failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Names of the fields that failed, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields that failed.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Check a task about to be created against `clock.utc()`.
///
/// Returns `Ok(())` when every rule passes, otherwise all failures.
pub fn validate_new_task(task: &Task, clock: &dyn Clock) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if task.due_date < clock.utc() {
        errors.add(DUE_DATE_FIELD, DUE_DATE_IN_PAST);
    }
    if task.is_completed {
        errors.add(IS_COMPLETED_FIELD, ALREADY_COMPLETED);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
