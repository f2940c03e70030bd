//! User profiles and game session lifecycle.
//!
//! [`SessionManager`] owns the profile store, every game session (open and
//! ended), the per-genre analytics archive, and each user's active-session
//! pointer. Ending a session runs the learning step against the owner's profile.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use super::learning::learn_from_session;
use super::types::{
    Difficulty, GameOutcome, GameSession, PreferenceUpdate, ProfileReader, SessionAnalytics,
    UserPreferences,
};
use super::{short_hash, unix_nanos};

const USER_ID_LEN: usize = 12;
const GAME_SESSION_ID_LEN: usize = 16;

#[derive(Default)]
struct ManagerState {
    profiles: HashMap<String, UserPreferences>,
    sessions: HashMap<String, GameSession>,
    /// genre -> ended sessions, in end order
    analytics: BTreeMap<String, Vec<GameSession>>,
    /// user -> open session
    active: HashMap<String, String>,
}

pub struct SessionManager {
    state: Mutex<ManagerState>,
    max_genres: usize,
    sequence: AtomicU64,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(5)
    }
}

impl SessionManager {
    pub fn new(max_genres: usize) -> Self {
        Self {
            state: Mutex::new(ManagerState::default()),
            max_genres,
            sequence: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("profile store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Derive a stable user id from client identity material and make sure a
    /// profile exists for it.
    pub fn create_user_session(&self, ip_address: &str, user_agent: &str) -> String {
        let user_id = short_hash(&format!("{ip_address}_{user_agent}"), USER_ID_LEN);
        let mut state = self.lock();
        if !state.profiles.contains_key(&user_id) {
            state.profiles.insert(user_id.clone(), UserPreferences::default());
            info!(user_id = %user_id, "user profile created");
        }
        user_id
    }

    /// Open a game session and mark it as the user's active one.
    ///
    /// A user id without a profile gets a default profile.
    pub fn start_game_session(
        &self,
        user_id: &str,
        game_id: &str,
        genre: &str,
        difficulty: Difficulty,
    ) -> String {
        self.start_game_session_at(user_id, game_id, genre, difficulty, Utc::now())
    }

    pub fn start_game_session_at(
        &self,
        user_id: &str,
        game_id: &str,
        genre: &str,
        difficulty: Difficulty,
        started_at: DateTime<Utc>,
    ) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let session_id = short_hash(
            &format!("{user_id}_{game_id}_{}_{seq}", unix_nanos()),
            GAME_SESSION_ID_LEN,
        );

        let session = GameSession {
            session_id: session_id.clone(),
            user_id: user_id.to_string(),
            game_id: game_id.to_string(),
            genre: genre.to_string(),
            start_time: started_at,
            end_time: None,
            duration: 0,
            score: 0,
            completed: false,
            difficulty,
            actions_taken: 0,
            preferences_learned: BTreeMap::new(),
        };

        let mut state = self.lock();
        state.sessions.insert(session_id.clone(), session);
        state.active.insert(user_id.to_string(), session_id.clone());

        let profile = state.profiles.entry(user_id.to_string()).or_default();
        profile.session_count += 1;
        profile.last_active = started_at.to_rfc3339();

        info!(
            session_id = %session_id,
            user_id = %user_id,
            genre = %genre,
            difficulty = %difficulty,
            "game session started"
        );
        session_id
    }

    /// Finalize a session and learn from it. Returns `false` (and changes
    /// nothing) when the id is unknown or the session already ended.
    pub fn end_game_session(&self, session_id: &str, outcome: GameOutcome) -> bool {
        self.end_game_session_at(session_id, outcome, Utc::now())
    }

    pub fn end_game_session_at(
        &self,
        session_id: &str,
        outcome: GameOutcome,
        ended_at: DateTime<Utc>,
    ) -> bool {
        let mut state = self.lock();
        let Some(session) = state.sessions.get_mut(session_id) else {
            debug!(session_id = %session_id, "end_game_session: unknown session");
            return false;
        };
        if !session.is_open() {
            debug!(session_id = %session_id, "end_game_session: already ended");
            return false;
        }

        session.end_time = Some(ended_at);
        session.score = outcome.score;
        session.completed = outcome.completed;
        session.actions_taken = outcome.actions_taken;
        session.duration = (ended_at - session.start_time).num_seconds().max(0) as u64;
        let mut finished = session.clone();

        let profile = state.profiles.entry(finished.user_id.clone()).or_default();
        finished.preferences_learned = learn_from_session(profile, &finished, self.max_genres);

        let learned: Vec<&String> = finished.preferences_learned.keys().collect();
        info!(
            session_id = %session_id,
            user_id = %finished.user_id,
            duration = finished.duration,
            score = finished.score,
            completed = finished.completed,
            learned = ?learned,
            "game session ended"
        );

        if let Some(stored) = state.sessions.get_mut(session_id) {
            stored.preferences_learned = finished.preferences_learned.clone();
        }
        if state.active.get(&finished.user_id).map(String::as_str) == Some(session_id) {
            state.active.remove(&finished.user_id);
        }
        state
            .analytics
            .entry(finished.genre.clone())
            .or_default()
            .push(finished);
        true
    }

    pub fn get_user_preferences(&self, user_id: &str) -> Option<UserPreferences> {
        self.lock().profiles.get(user_id).cloned()
    }

    /// Apply a manual update. Unknown users are left alone and yield `false`.
    pub fn update_user_preferences(&self, user_id: &str, update: PreferenceUpdate) -> bool {
        let mut state = self.lock();
        match state.profiles.get_mut(user_id) {
            Some(profile) => {
                update.apply_to(profile);
                info!(user_id = %user_id, "user preferences updated");
                true
            }
            None => false,
        }
    }

    pub fn game_session(&self, session_id: &str) -> Option<GameSession> {
        self.lock().sessions.get(session_id).cloned()
    }

    pub fn active_session(&self, user_id: &str) -> Option<String> {
        self.lock().active.get(user_id).cloned()
    }

    /// Aggregates over ended sessions for one genre, or all genres.
    pub fn get_session_analytics(&self, genre: Option<&str>) -> SessionAnalytics {
        let state = self.lock();
        let sessions: Vec<&GameSession> = match genre {
            Some(g) => state.analytics.get(g).map(|v| v.iter().collect()).unwrap_or_default(),
            None => state.analytics.values().flatten().collect(),
        };
        if sessions.is_empty() {
            return SessionAnalytics::empty();
        }

        let total = sessions.len();
        let completed = sessions.iter().filter(|s| s.completed).count();
        let playtime: u64 = sessions.iter().map(|s| s.duration).sum();
        let score_sum: i128 = sessions.iter().map(|s| i128::from(s.score)).sum();

        SessionAnalytics {
            total_sessions: total,
            completed_sessions: Some(completed),
            completion_rate: Some(completed as f64 / total as f64),
            total_playtime: Some(playtime),
            avg_playtime: Some(playtime as f64 / total as f64),
            avg_score: Some(score_sum as f64 / total as f64),
            genres_played: Some(state.analytics.keys().cloned().collect()),
        }
    }
}

impl ProfileReader for SessionManager {
    fn user_preferences(&self, user_id: &str) -> Option<UserPreferences> {
        self.get_user_preferences(user_id)
    }

    fn session_analytics(&self, genre: Option<&str>) -> SessionAnalytics {
        self.get_session_analytics(genre)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personalization::types::PlayStyle;
    use chrono::Duration;

    fn outcome(score: i64, completed: bool, actions: u32) -> GameOutcome {
        GameOutcome {
            score,
            completed,
            actions_taken: actions,
        }
    }

    #[test]
    fn user_id_is_stable_and_short() {
        let manager = SessionManager::default();
        let a = manager.create_user_session("10.0.0.1", "firefox");
        let b = manager.create_user_session("10.0.0.1", "firefox");
        let c = manager.create_user_session("10.0.0.2", "firefox");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
        assert!(manager.get_user_preferences(&a).is_some());
    }

    #[test]
    fn start_marks_active_and_counts() {
        let manager = SessionManager::default();
        let user = manager.create_user_session("1.2.3.4", "");
        let sid = manager.start_game_session(&user, "g1", "puzzle", Difficulty::Easy);

        assert_eq!(sid.len(), 16);
        assert_eq!(manager.active_session(&user).as_deref(), Some(sid.as_str()));
        assert_eq!(manager.get_user_preferences(&user).unwrap().session_count, 1);
        assert!(manager.game_session(&sid).unwrap().is_open());
    }

    #[test]
    fn rapid_starts_get_distinct_ids() {
        let manager = SessionManager::default();
        let user = manager.create_user_session("1.2.3.4", "");
        let a = manager.start_game_session(&user, "g", "puzzle", Difficulty::Medium);
        let b = manager.start_game_session(&user, "g", "puzzle", Difficulty::Medium);
        assert_ne!(a, b);
    }

    #[test]
    fn end_computes_duration_and_learns() {
        let manager = SessionManager::default();
        let user = manager.create_user_session("1.2.3.4", "");
        let start = Utc::now();
        let sid = manager.start_game_session_at(&user, "g1", "puzzle", Difficulty::Easy, start);

        assert!(manager.end_game_session_at(&sid, outcome(50, true, 60), start + Duration::seconds(45)));

        let session = manager.game_session(&sid).unwrap();
        assert_eq!(session.duration, 45);
        assert!(!session.is_open());
        assert!(session.preferences_learned.contains_key("genre_promoted"));

        let prefs = manager.get_user_preferences(&user).unwrap();
        assert_eq!(prefs.total_playtime, 45);
        assert_eq!(prefs.preferred_genres, vec!["puzzle"]);
        assert_eq!(prefs.preferred_difficulty, Difficulty::Medium);
        // 60 actions in 45s = 80 apm
        assert_eq!(prefs.play_style, PlayStyle::Aggressive);
        assert!(manager.active_session(&user).is_none());
    }

    #[test]
    fn ending_twice_is_a_no_op() {
        let manager = SessionManager::default();
        let user = manager.create_user_session("1.2.3.4", "");
        let start = Utc::now();
        let sid = manager.start_game_session_at(&user, "g1", "rpg", Difficulty::Medium, start);

        assert!(manager.end_game_session_at(&sid, outcome(200, false, 0), start + Duration::seconds(300)));
        assert!(!manager.end_game_session_at(&sid, outcome(200, false, 0), start + Duration::seconds(600)));

        let prefs = manager.get_user_preferences(&user).unwrap();
        assert_eq!(prefs.total_playtime, 300);
        assert_eq!(prefs.preferred_genres, vec!["rpg"]);
        assert_eq!(manager.get_session_analytics(None).total_sessions, 1);
    }

    #[test]
    fn ending_unknown_session_is_a_no_op() {
        let manager = SessionManager::default();
        assert!(!manager.end_game_session("nope", outcome(1, true, 1)));
    }

    #[test]
    fn analytics_by_genre() {
        let manager = SessionManager::default();
        let user = manager.create_user_session("1.2.3.4", "");
        let start = Utc::now();

        let a = manager.start_game_session_at(&user, "g", "puzzle", Difficulty::Medium, start);
        manager.end_game_session_at(&a, outcome(100, true, 0), start + Duration::seconds(100));
        let b = manager.start_game_session_at(&user, "g", "puzzle", Difficulty::Medium, start);
        manager.end_game_session_at(&b, outcome(0, false, 0), start + Duration::seconds(300));
        let c = manager.start_game_session_at(&user, "g", "racing", Difficulty::Medium, start);
        manager.end_game_session_at(&c, outcome(30, true, 0), start + Duration::seconds(60));

        let puzzle = manager.get_session_analytics(Some("puzzle"));
        assert_eq!(puzzle.total_sessions, 2);
        assert_eq!(puzzle.completed_sessions, Some(1));
        assert_eq!(puzzle.completion_rate, Some(0.5));
        assert_eq!(puzzle.total_playtime, Some(400));
        assert_eq!(puzzle.avg_score, Some(50.0));

        let all = manager.get_session_analytics(None);
        assert_eq!(all.total_sessions, 3);
        assert_eq!(
            all.genres_played,
            Some(vec!["puzzle".to_string(), "racing".to_string()])
        );

        assert_eq!(manager.get_session_analytics(Some("shooter")).total_sessions, 0);
    }

    #[test]
    fn average_score_survives_extreme_scores() {
        let manager = SessionManager::default();
        let user = manager.create_user_session("1.2.3.4", "");
        let start = Utc::now();
        for _ in 0..2 {
            let sid = manager.start_game_session_at(&user, "g", "arcade", Difficulty::Medium, start);
            manager.end_game_session_at(&sid, outcome(i64::MAX, false, 0), start + Duration::seconds(10));
        }
        let neg = manager.start_game_session_at(&user, "g", "arcade", Difficulty::Medium, start);
        manager.end_game_session_at(&neg, outcome(i64::MIN, false, 0), start + Duration::seconds(10));

        let analytics = manager.get_session_analytics(None);
        assert_eq!(analytics.total_sessions, 3);
        let expected = (2 * i128::from(i64::MAX) + i128::from(i64::MIN)) as f64 / 3.0;
        assert_eq!(analytics.avg_score, Some(expected));
    }

    #[test]
    fn update_preferences_unknown_user() {
        let manager = SessionManager::default();
        assert!(!manager.update_user_preferences("ghost", PreferenceUpdate::default()));
    }
}
