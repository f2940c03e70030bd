//! Entry logging, the write path for cognition sessions.

use serde_json::Value;
use tracing::debug;

use super::types::{Entry, SessionWriter};

/// Record one request/response interaction in a session.
///
/// Logging into an id that was never started creates the session bucket, so
/// handlers can log before anyone calls `start_session`. Returns the stored entry.
pub fn log_entry(
    writer: &dyn SessionWriter,
    session_id: &str,
    route: &str,
    request: Value,
    response: Value,
) -> Entry {
    let entry = Entry::new(route, request, response);
    writer.append_entry(session_id, entry.clone());
    debug!(session_id = %session_id, route = %route, "entry logged");
    entry
}
