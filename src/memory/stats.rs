//! Store-wide statistics for dashboards.

use serde::Serialize;
use std::collections::HashMap;

use super::integrity::entries_intact;
use super::types::{SessionReader, UNKNOWN_START};

/// Response from memory_stats.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_sessions: u64,
    pub total_entries: u64,
    pub by_route: HashMap<String, u64>,
    pub valid_sessions: u64,
    pub corrupted_sessions: u64,
    /// Last-inserted session, without creating one on an empty store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_session: Option<String>,
}

/// Compute session store statistics across every session.
///
/// Oldest/newest come from session start times; implicitly created buckets
/// (start `"unknown"`) are left out of the range.
pub fn memory_stats(reader: &dyn SessionReader) -> StatsResponse {
    let mut total_entries = 0u64;
    let mut by_route: HashMap<String, u64> = HashMap::new();
    let mut valid = 0u64;
    let mut starts: Vec<String> = Vec::new();

    let ids = reader.session_ids();
    for id in &ids {
        let Some(record) = reader.session(id) else {
            continue;
        };
        total_entries += record.entries.len() as u64;
        for entry in &record.entries {
            *by_route.entry(entry.route_name().to_string()).or_insert(0) += 1;
        }
        if entries_intact(&record.entries) {
            valid += 1;
        }
        if record.started != UNKNOWN_START {
            starts.push(record.started);
        }
    }

    let total_sessions = ids.len() as u64;
    StatsResponse {
        total_sessions,
        total_entries,
        by_route,
        valid_sessions: valid,
        corrupted_sessions: total_sessions - valid,
        current_session: ids.last().cloned(),
        oldest_session: starts.iter().min().cloned(),
        newest_session: starts.iter().max().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::entries::log_entry;
    use crate::memory::sessions::SessionStore;
    use serde_json::json;

    #[test]
    fn test_empty_store_stats() {
        let store = SessionStore::new();
        let stats = memory_stats(&store);
        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_entries, 0);
        assert!(stats.by_route.is_empty());
        assert!(stats.current_session.is_none());
        assert!(stats.oldest_session.is_none());
        assert!(stats.newest_session.is_none());
    }

    #[test]
    fn test_stats_counts_by_route() {
        let store = SessionStore::new();
        let a = store.start_session();
        let b = store.start_session();
        log_entry(&store, &a, "chat", json!("hi"), json!("hello"));
        log_entry(&store, &a, "story", json!("once"), json!("upon"));
        log_entry(&store, &b, "chat", json!("yo"), json!("hey"));

        let stats = memory_stats(&store);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.by_route["chat"], 2);
        assert_eq!(stats.by_route["story"], 1);
        assert_eq!(stats.valid_sessions, 2);
        assert_eq!(stats.corrupted_sessions, 0);
        assert_eq!(stats.current_session.as_deref(), Some(b.as_str()));
        assert!(stats.oldest_session.is_some());
    }

    #[test]
    fn test_stats_skips_unknown_start() {
        let store = SessionStore::new();
        log_entry(&store, "implicit", "chat", json!("hi"), json!("hello"));

        let stats = memory_stats(&store);
        assert_eq!(stats.total_sessions, 1);
        assert!(stats.oldest_session.is_none());
    }
}
