//! Structural integrity checks over stored and exported sessions.
//!
//! Only shape is checked: every entry must carry `route`, `request`,
//! `response`, and `timestamp`. Payload contents are never inspected.

use serde_json::Value;

use super::types::{Entry, SessionReader};

/// Every entry carries `route`, `request`, `response`, and `timestamp`.
/// An explicit `null` counts as present.
pub fn entries_intact(entries: &[Entry]) -> bool {
    entries.iter().all(Entry::is_complete)
}

/// `false` when the session is missing or any entry lacks a required field.
pub fn validate_memory(reader: &dyn SessionReader, session_id: &str) -> bool {
    reader
        .session(session_id)
        .is_some_and(|record| entries_intact(&record.entries))
}

/// The same check over a raw JSON session record (`{"entries": [...]}`).
///
/// `false` when `entries` is absent or not a list, when an entry is not an
/// object, or when an entry lacks a required key.
pub fn validate_snapshot_record(record: &Value) -> bool {
    let Some(entries) = record.get("entries").filter(|e| e.is_array()) else {
        return false;
    };
    serde_json::from_value::<Vec<Entry>>(entries.clone())
        .is_ok_and(|entries| entries_intact(&entries))
}
