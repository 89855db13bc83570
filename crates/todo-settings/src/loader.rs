//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`TodoSettings::default()`]
//! 2. If `~/.todo/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Reject values no server could run with
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::TodoSettings;

/// Resolve the path to the settings file (`~/.todo/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".todo").join("settings.json")
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<TodoSettings> {
    load_with_lookup(path, |name| std::env::var(name).ok())
}

fn load_with_lookup(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<TodoSettings> {
    let defaults = serde_json::to_value(TodoSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: TodoSettings = serde_json::from_value(merged)?;
    apply_overrides(&mut settings, lookup);
    validate(&settings)?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `TODO_*` overrides read through `lookup`.
///
/// Invalid values are logged and ignored (fall back to file/default).
pub fn apply_overrides(settings: &mut TodoSettings, lookup: impl Fn(&str) -> Option<String>) {
    let string = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = string("TODO_HOST") {
        settings.server.host = v;
    }
    if let Some(raw) = string("TODO_PORT") {
        match parse_u16_range(&raw, 1, u16::MAX) {
            Some(v) => settings.server.port = v,
            None => warn!(key = "TODO_PORT", value = %raw, "invalid port env var, ignoring"),
        }
    }
    if let Some(raw) = string("TODO_MAX_BODY_BYTES") {
        match parse_usize_range(&raw, 1024, 64 * 1024 * 1024) {
            Some(v) => settings.server.max_body_bytes = v,
            None => warn!(key = "TODO_MAX_BODY_BYTES", value = %raw, "invalid size env var, ignoring"),
        }
    }
    if let Some(raw) = string("TODO_SHUTDOWN_TIMEOUT_SECS") {
        match parse_u64_range(&raw, 1, 600) {
            Some(v) => settings.server.shutdown_timeout_secs = v,
            None => warn!(key = "TODO_SHUTDOWN_TIMEOUT_SECS", value = %raw, "invalid timeout env var, ignoring"),
        }
    }
    if let Some(raw) = string("TODO_CORS_PERMISSIVE") {
        match parse_bool(&raw) {
            Some(v) => settings.server.cors_permissive = v,
            None => warn!(key = "TODO_CORS_PERMISSIVE", value = %raw, "invalid boolean env var, ignoring"),
        }
    }
    if let Some(v) = string("TODO_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

/// Reject settings the server cannot start with.
pub fn validate(settings: &TodoSettings) -> Result<()> {
    if settings.server.host.trim().is_empty() {
        return Err(SettingsError::InvalidValue("server.host must not be empty".into()));
    }
    if settings.server.max_body_bytes == 0 {
        return Err(SettingsError::InvalidValue("server.maxBodyBytes must be non-zero".into()));
    }
    Ok(())
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (n >= min && n <= max).then_some(n)
}
