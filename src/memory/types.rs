//! Cognition-domain record types.
//!
//! Defines [`Entry`] (one logged interaction), [`SessionRecord`] (a session's
//! metadata plus its ordered entries), and the narrow [`SessionReader`] /
//! [`SessionWriter`] interfaces that recall, summary, feedback, and integrity
//! code depend on instead of the concrete store.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Timestamp format used for session starts and entries (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Session start marker for buckets created implicitly by logging.
pub const UNKNOWN_START: &str = "unknown";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One logged request/response interaction.
///
/// Entries produced by the logger always carry all four fields as strings and
/// payloads. Fields are held as optional raw JSON only because restored
/// snapshots may be structurally incomplete or oddly typed; the integrity
/// check reports missing keys, and an explicit `null` counts as present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub route: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

/// Keeps an explicit JSON `null` distinct from a missing key.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl Entry {
    /// Build a complete entry stamped with the current local time.
    pub fn new(route: impl Into<String>, request: Value, response: Value) -> Self {
        Self {
            route: Some(Value::String(route.into())),
            request: Some(request),
            response: Some(response),
            timestamp: Some(Value::String(local_timestamp())),
        }
    }

    /// All four required fields are present.
    pub fn is_complete(&self) -> bool {
        self.route.is_some()
            && self.request.is_some()
            && self.response.is_some()
            && self.timestamp.is_some()
    }

    /// Route as a string, `None` when missing or not a string.
    pub fn route_str(&self) -> Option<&str> {
        self.route.as_ref().and_then(Value::as_str)
    }

    /// Route name, or `""` when the entry has no string route.
    pub fn route_name(&self) -> &str {
        self.route_str().unwrap_or("")
    }

    pub fn timestamp_str(&self) -> Option<&str> {
        self.timestamp.as_ref().and_then(Value::as_str)
    }

    /// Request payload rendered as text. Strings are taken verbatim, other
    /// values use their compact JSON form, a missing request is empty.
    pub fn request_text(&self) -> String {
        match &self.request {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

/// A cognition session: when it started and what was logged into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub started: String,
    pub entries: Vec<Entry>,
}

impl SessionRecord {
    /// A fresh, empty session started now.
    pub fn started_now() -> Self {
        Self {
            started: local_timestamp(),
            entries: Vec::new(),
        }
    }

    /// Bucket created by logging into an id that was never started.
    pub fn unstarted() -> Self {
        Self {
            started: UNKNOWN_START.to_string(),
            entries: Vec::new(),
        }
    }
}

/// Response of `current_session`.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentSession {
    pub session_id: String,
    pub metadata: SessionRecord,
}

/// Read access to cognition sessions.
pub trait SessionReader: Send + Sync {
    /// Snapshot of one session, `None` when absent.
    fn session(&self, session_id: &str) -> Option<SessionRecord>;

    /// Most recently *inserted* session id, creating a session when none exist.
    ///
    /// Insertion order, not last activity: an idle session stays current until
    /// a newer one is started.
    fn current_session_id(&self) -> String;

    /// All session ids in insertion order.
    fn session_ids(&self) -> Vec<String>;
}

/// Write access to cognition sessions.
pub trait SessionWriter: Send + Sync {
    /// Append to a session, creating an unstarted bucket for unknown ids.
    fn append_entry(&self, session_id: &str, entry: Entry);
}
