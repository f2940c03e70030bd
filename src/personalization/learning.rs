//! Preference learning from a finished game session.

use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::types::{Difficulty, GameSession, PlayStyle, UserPreferences};

/// Score above which a played genre is promoted to the front.
const PROMOTION_SCORE: i64 = 100;
const QUICK_EASY_SECS: u64 = 60;
const QUICK_MEDIUM_SECS: u64 = 120;
const AGGRESSIVE_APM: f64 = 30.0;
const CAREFUL_APM: f64 = 10.0;

/// Apply the learning rules for one ended session, in order:
/// playtime, genre preference, difficulty, play style.
///
/// Returns what changed, keyed by preference name.
pub fn learn_from_session(
    profile: &mut UserPreferences,
    session: &GameSession,
    max_genres: usize,
) -> BTreeMap<String, Value> {
    let mut learned = BTreeMap::new();

    profile.total_playtime += session.duration;

    if session.completed || session.score > 0 {
        if !profile.preferred_genres.contains(&session.genre) {
            profile.preferred_genres.push(session.genre.clone());
            learned.insert("genre_added".to_string(), json!(session.genre));
        }
        if session.score > PROMOTION_SCORE || session.completed {
            profile.preferred_genres.retain(|g| g != &session.genre);
            profile.preferred_genres.insert(0, session.genre.clone());
            learned.insert("genre_promoted".to_string(), json!(session.genre));
        }
        profile.preferred_genres.truncate(max_genres);
    }

    if let Some(difficulty) = next_difficulty(session) {
        if difficulty != profile.preferred_difficulty {
            profile.preferred_difficulty = difficulty;
            learned.insert("preferred_difficulty".to_string(), json!(difficulty));
        }
    }

    if session.actions_taken > 0 {
        let apm = actions_per_minute(session.actions_taken, session.duration);
        profile.play_style = classify_play_style(apm);
        learned.insert("actions_per_minute".to_string(), json!(apm));
        learned.insert("play_style".to_string(), json!(profile.play_style));
    }

    learned
}

/// Difficulty the profile should move to after this session, if any.
fn next_difficulty(session: &GameSession) -> Option<Difficulty> {
    match (session.difficulty, session.completed) {
        (Difficulty::Easy, true) if session.duration < QUICK_EASY_SECS => Some(Difficulty::Medium),
        (Difficulty::Medium, true) if session.duration < QUICK_MEDIUM_SECS => Some(Difficulty::Hard),
        (Difficulty::Hard, false) => Some(Difficulty::Medium),
        _ => None,
    }
}

/// Actions per 60 seconds, with duration floored at one second.
pub fn actions_per_minute(actions: u32, duration_secs: u64) -> f64 {
    actions as f64 * 60.0 / duration_secs.max(1) as f64
}

pub fn classify_play_style(apm: f64) -> PlayStyle {
    if apm > AGGRESSIVE_APM {
        PlayStyle::Aggressive
    } else if apm < CAREFUL_APM {
        PlayStyle::Careful
    } else {
        PlayStyle::Balanced
    }
}
