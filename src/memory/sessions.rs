//! Process-wide cognition session store.
//!
//! [`SessionStore`] keeps sessions keyed by id together with their insertion
//! order, which is what "current session" resolves against. All access goes
//! through one mutex; poisoned guards are recovered rather than propagated.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::types::{CurrentSession, Entry, SessionReader, SessionRecord, SessionWriter};
use crate::error::MythiqError;

#[derive(Default)]
struct SessionTable {
    order: Vec<String>,
    records: HashMap<String, SessionRecord>,
}

impl SessionTable {
    fn insert(&mut self, session_id: String, record: SessionRecord) {
        if self.records.insert(session_id.clone(), record).is_none() {
            self.order.push(session_id);
        }
    }

    /// Drop oldest-inserted sessions until at most `cap` remain.
    fn evict_to(&mut self, cap: usize) {
        while self.order.len() > cap.max(1) {
            let oldest = self.order.remove(0);
            self.records.remove(&oldest);
            debug!(session_id = %oldest, "evicted session over capacity");
        }
    }
}

/// One session in an exported snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(flatten)]
    pub record: SessionRecord,
}

/// Keyed store of cognition sessions.
#[derive(Default)]
pub struct SessionStore {
    table: Mutex<SessionTable>,
    max_sessions: Option<usize>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that evicts the oldest-inserted sessions past `max_sessions`.
    pub fn with_capacity_limit(max_sessions: Option<usize>) -> Self {
        Self {
            table: Mutex::new(SessionTable::default()),
            max_sessions,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionTable> {
        self.table.lock().unwrap_or_else(|poisoned| {
            warn!("session store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn insert_locked(&self, table: &mut SessionTable, session_id: String, record: SessionRecord) {
        table.insert(session_id, record);
        if let Some(cap) = self.max_sessions {
            table.evict_to(cap);
        }
    }

    /// Create an empty session and return its id.
    pub fn start_session(&self) -> String {
        let session_id = uuid::Uuid::new_v4().to_string();
        let mut table = self.lock();
        self.insert_locked(&mut table, session_id.clone(), SessionRecord::started_now());
        info!(session_id = %session_id, "session started");
        session_id
    }

    /// The most recently inserted session, created on demand when the store is empty.
    pub fn current_session(&self) -> CurrentSession {
        let mut table = self.lock();
        let existing = table.order.last().cloned();
        let session_id = match existing {
            Some(id) => id,
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                self.insert_locked(&mut table, id.clone(), SessionRecord::started_now());
                info!(session_id = %id, "session started for current_session");
                id
            }
        };
        let metadata = table
            .records
            .get(&session_id)
            .cloned()
            .unwrap_or_else(SessionRecord::started_now);
        CurrentSession {
            session_id,
            metadata,
        }
    }

    /// Full record for a session, or `None` when the id is unknown.
    pub fn get_session_data(&self, session_id: &str) -> Option<SessionRecord> {
        self.lock().records.get(session_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every session in insertion order.
    pub fn export_snapshot(&self) -> Vec<SessionSnapshot> {
        let table = self.lock();
        table
            .order
            .iter()
            .filter_map(|id| {
                table.records.get(id).map(|record| SessionSnapshot {
                    session_id: id.clone(),
                    record: record.clone(),
                })
            })
            .collect()
    }

    /// Restore sessions from an exported JSON array.
    ///
    /// Records replace any existing session with the same id. Entries missing
    /// required fields are accepted as-is; `validate_memory` reports them.
    /// Returns the number of sessions restored.
    pub fn import_snapshot(&self, json: &serde_json::Value) -> Result<usize, MythiqError> {
        let items = json
            .as_array()
            .ok_or_else(|| MythiqError::InvalidSnapshot("expected an array of sessions".into()))?;

        for (i, item) in items.iter().enumerate() {
            if !item.get("entries").is_some_and(|e| e.is_array()) {
                return Err(MythiqError::InvalidSnapshot(format!(
                    "session {i}: `entries` must be a list"
                )));
            }
        }
        let snapshots: Vec<SessionSnapshot> = serde_json::from_value(json.clone())?;

        let count = snapshots.len();
        let mut table = self.lock();
        for snapshot in snapshots {
            self.insert_locked(&mut table, snapshot.session_id, snapshot.record);
        }
        info!(count, "sessions imported");
        Ok(count)
    }
}

impl SessionReader for SessionStore {
    fn session(&self, session_id: &str) -> Option<SessionRecord> {
        self.get_session_data(session_id)
    }

    fn current_session_id(&self) -> String {
        self.current_session().session_id
    }

    fn session_ids(&self) -> Vec<String> {
        self.lock().order.clone()
    }
}

impl SessionWriter for SessionStore {
    fn append_entry(&self, session_id: &str, entry: Entry) {
        let mut table = self.lock();
        if let Some(record) = table.records.get_mut(session_id) {
            record.entries.push(entry);
            return;
        }
        let mut record = SessionRecord::unstarted();
        record.entries.push(entry);
        self.insert_locked(&mut table, session_id.to_string(), record);
        debug!(session_id = %session_id, "created session bucket on first log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_session_creates_empty_record() {
        let store = SessionStore::new();
        let id = store.start_session();
        let record = store.get_session_data(&id).unwrap();
        assert!(record.entries.is_empty());
        assert_ne!(record.started, "unknown");
    }

    #[test]
    fn session_ids_are_unique() {
        let store = SessionStore::new();
        let a = store.start_session();
        let b = store.start_session();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn current_session_creates_when_empty() {
        let store = SessionStore::new();
        assert!(store.is_empty());
        let current = store.current_session();
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_session().session_id, current.session_id);
    }

    #[test]
    fn current_session_is_last_inserted_not_last_touched() {
        let store = SessionStore::new();
        let first = store.start_session();
        let second = store.start_session();

        store.append_entry(&first, Entry::new("r", json!({}), json!({})));

        assert_eq!(store.current_session_id(), second);
    }

    #[test]
    fn unknown_session_is_none() {
        let store = SessionStore::new();
        assert!(store.get_session_data("missing").is_none());
    }

    #[test]
    fn append_to_unknown_creates_unstarted_bucket() {
        let store = SessionStore::new();
        store.append_entry("late", Entry::new("r", json!(1), json!(2)));
        let record = store.get_session_data("late").unwrap();
        assert_eq!(record.started, "unknown");
        assert_eq!(record.entries.len(), 1);
    }

    #[test]
    fn capacity_limit_evicts_oldest() {
        let store = SessionStore::with_capacity_limit(Some(2));
        let a = store.start_session();
        let b = store.start_session();
        let c = store.start_session();

        assert!(store.get_session_data(&a).is_none());
        assert!(store.get_session_data(&b).is_some());
        assert_eq!(store.session_ids(), vec![b, c]);
    }

    #[test]
    fn snapshot_export_import_preserves_order() {
        let store = SessionStore::new();
        let a = store.start_session();
        let b = store.start_session();
        store.append_entry(&a, Entry::new("x", json!("q"), json!("a")));

        let exported = serde_json::to_value(store.export_snapshot()).unwrap();

        let restored = SessionStore::new();
        assert_eq!(restored.import_snapshot(&exported).unwrap(), 2);
        assert_eq!(restored.session_ids(), vec![a.clone(), b]);
        assert_eq!(restored.get_session_data(&a).unwrap().entries.len(), 1);
    }

    #[test]
    fn import_rejects_non_list_entries() {
        let store = SessionStore::new();
        let bad = json!([{ "session_id": "s", "started": "now", "entries": {"route": "r"} }]);
        let err = store.import_snapshot(&bad).unwrap_err();
        assert!(err.to_string().contains("must be a list"));
        assert!(store.is_empty());
    }
}
