//! The todo record.
//!
//! A [`Task`] is a plain value: it is created once by the caller, stored as-is
//! and never mutated in place. Wire field names are camelCase
//! (`id`, `name`, `dueDate`, `isCompleted`); PascalCase names are accepted
//! on input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Caller-supplied task identifier.
pub type TaskId = i32;

/// A single todo record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Identifier chosen by the caller. Intended unique, not enforced by `add`.
    #[serde(alias = "Id")]
    pub id: TaskId,
    /// Display name.
    #[serde(alias = "Name")]
    pub name: String,
    /// When the task is due, always normalised to UTC.
    #[serde(
        alias = "DueDate",
        serialize_with = "serialize_due_date",
        deserialize_with = "deserialize_due_date"
    )]
    pub due_date: DateTime<Utc>,
    /// Whether the task is done.
    #[serde(alias = "IsCompleted")]
    pub is_completed: bool,
}

impl Task {
    /// Build a task.
    pub fn new(id: TaskId, name: impl Into<String>, due_date: DateTime<Utc>, is_completed: bool) -> Self {
        Self {
            id,
            name: name.into(),
            due_date,
            is_completed,
        }
    }

    /// Location of this task under the `/todos` collection.
    pub fn location(&self) -> String {
        format!("/todos/{}", self.id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Due date wire format
// ─────────────────────────────────────────────────────────────────────────────

fn serialize_due_date<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn deserialize_due_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_due_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {raw}")))
}

/// Offset-less date-time layouts, tried in order. All are taken as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts, in order:
/// - RFC 3339 with an offset (`2030-01-02T03:04:05+02:00`), converted to UTC
/// - a basic offset without colon (`2030-01-02T03:04:05+0200`)
/// - a date-time without offset, or with a bare `Z`, seconds optional
///   (`2030-01-02T03:04:05.123`, `2030-01-02T03:04Z`), taken as UTC
/// - a bare date (`2030-01-02`), taken as midnight UTC
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
    {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
