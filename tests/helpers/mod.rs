#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use mythiq::memory::entries::log_entry;
use mythiq::memory::SessionStore;
use mythiq::personalization::{Difficulty, GameOutcome, SessionManager};
use serde_json::json;

/// A store with one started session. Returns the store and the session id.
pub fn store_with_session() -> (SessionStore, String) {
    let store = SessionStore::new();
    let id = store.start_session();
    (store, id)
}

/// Log one entry per route, with the route name echoed into the payloads.
pub fn log_routes(store: &SessionStore, session_id: &str, routes: &[&str]) {
    for route in routes {
        log_entry(
            store,
            session_id,
            route,
            json!(format!("{route} request")),
            json!({ "reply": route }),
        );
    }
}

/// Play one game from start to end with explicit timestamps.
/// Returns the game session id.
pub fn play_game(
    manager: &SessionManager,
    user_id: &str,
    genre: &str,
    difficulty: Difficulty,
    start: DateTime<Utc>,
    duration_secs: i64,
    outcome: GameOutcome,
) -> String {
    let sid = manager.start_game_session_at(user_id, "game", genre, difficulty, start);
    manager.end_game_session_at(&sid, outcome, start + Duration::seconds(duration_secs));
    sid
}

pub fn outcome(score: i64, completed: bool, actions_taken: u32) -> GameOutcome {
    GameOutcome {
        score,
        completed,
        actions_taken,
    }
}
