//! Recommendation bundles and full personalized game configs.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use super::seed::{SeedVarianceConfig, SeedVarianceEngine};
use super::types::{Difficulty, PlayStyle, ProfileReader, SessionAnalytics, UserPreferences};
use crate::config::PersonalizationConfig;

const DEFAULT_GENRES: [&str; 3] = ["puzzle", "shooter", "platformer"];
const DEFAULT_THEMES: [&str; 3] = ["colorful", "modern", "friendly"];
const SUGGESTED_GENRES: usize = 3;
const MAX_THEMES: usize = 5;
const PERSONALIZATION_VERSION: &str = "1.0";

/// User classification cutoffs.
#[derive(Debug, Clone, Copy)]
pub struct UserThresholds {
    /// Below this many sessions a user counts as new.
    pub new_user_sessions: u32,
    /// At or above this many sessions a user counts as returning.
    pub returning_user_sessions: u32,
    /// Above this much playtime a user counts as a power user.
    pub power_user_playtime_secs: u64,
}

impl Default for UserThresholds {
    fn default() -> Self {
        Self::from(&PersonalizationConfig::default())
    }
}

impl From<&PersonalizationConfig> for UserThresholds {
    fn from(config: &PersonalizationConfig) -> Self {
        Self {
            new_user_sessions: config.new_user_sessions,
            returning_user_sessions: config.returning_user_sessions,
            power_user_playtime_secs: config.power_user_playtime_secs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub suggested_genres: Vec<String>,
    pub suggested_difficulty: Difficulty,
    pub suggested_themes: Vec<String>,
    pub personalization_score: f64,
    pub new_user: bool,
    pub returning_user: bool,
    pub power_user: bool,
}

impl Recommendations {
    /// Bundle for a user with no profile.
    pub fn first_contact() -> Self {
        Self {
            suggested_genres: DEFAULT_GENRES.iter().map(|g| g.to_string()).collect(),
            suggested_difficulty: Difficulty::Medium,
            suggested_themes: DEFAULT_THEMES.iter().map(|t| t.to_string()).collect(),
            personalization_score: 0.0,
            new_user: true,
            returning_user: false,
            power_user: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationMetadata {
    pub user_id: String,
    pub genre: String,
    pub description: String,
    pub timestamp: String,
    pub personalization_version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalizedGameConfig {
    pub seed_config: SeedVarianceConfig,
    pub recommendations: Recommendations,
    pub user_preferences: Option<UserPreferences>,
    pub personalization_applied: bool,
    pub generation_metadata: GenerationMetadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum UserAnalytics {
    User {
        preferences: Option<UserPreferences>,
        recommendations: Recommendations,
        session_analytics: SessionAnalytics,
    },
    Global(SessionAnalytics),
}

/// How well a profile is known, in `[0, 1]`.
pub fn personalization_score(prefs: &UserPreferences) -> f64 {
    let mut score = 0.0;
    score += (prefs.preferred_genres.len() as f64 / 5.0).min(0.3);
    score += (prefs.session_count as f64 / 20.0).min(0.3);
    score += (prefs.total_playtime as f64 / 7200.0).min(0.2);
    if prefs.play_style != PlayStyle::Balanced {
        score += 0.1;
    }
    if prefs.accessibility_needs.any() {
        score += 0.1;
    }
    score.clamp(0.0, 1.0)
}

/// Theme tags from color and play-style preferences, first-seen order, at most five.
pub fn theme_suggestions(prefs: &UserPreferences) -> Vec<String> {
    let mut themes: Vec<&str> = Vec::new();
    for (color, tags) in [
        ("blue", ["ocean", "sky", "tech"]),
        ("red", ["fire", "energy", "passion"]),
        ("green", ["nature", "forest", "growth"]),
    ] {
        if prefs.prefers_color(color) {
            themes.extend(tags);
        }
    }
    themes.extend(match prefs.play_style {
        PlayStyle::Aggressive => ["action", "intense", "competitive"],
        PlayStyle::Careful => ["calm", "strategic", "thoughtful"],
        PlayStyle::Balanced => ["balanced", "versatile", "adaptive"],
    });

    let mut out: Vec<String> = Vec::new();
    for theme in themes {
        if out.len() == MAX_THEMES {
            break;
        }
        if !out.iter().any(|t| t == theme) {
            out.push(theme.to_string());
        }
    }
    out
}

pub struct PersonalizationEngine {
    profiles: Arc<dyn ProfileReader>,
    seeds: Arc<SeedVarianceEngine>,
    thresholds: UserThresholds,
}

impl PersonalizationEngine {
    pub fn new(profiles: Arc<dyn ProfileReader>, seeds: Arc<SeedVarianceEngine>) -> Self {
        Self::with_thresholds(profiles, seeds, UserThresholds::default())
    }

    pub fn with_thresholds(
        profiles: Arc<dyn ProfileReader>,
        seeds: Arc<SeedVarianceEngine>,
        thresholds: UserThresholds,
    ) -> Self {
        Self {
            profiles,
            seeds,
            thresholds,
        }
    }

    pub fn seeds(&self) -> &SeedVarianceEngine {
        &self.seeds
    }

    pub fn get_personalized_recommendations(&self, user_id: &str) -> Recommendations {
        match self.profiles.user_preferences(user_id) {
            Some(prefs) => self.recommend(&prefs),
            None => Recommendations::first_contact(),
        }
    }

    fn recommend(&self, prefs: &UserPreferences) -> Recommendations {
        let suggested_genres = if prefs.preferred_genres.is_empty() {
            DEFAULT_GENRES.iter().map(|g| g.to_string()).collect()
        } else {
            prefs
                .preferred_genres
                .iter()
                .take(SUGGESTED_GENRES)
                .cloned()
                .collect()
        };

        Recommendations {
            suggested_genres,
            suggested_difficulty: prefs.preferred_difficulty,
            suggested_themes: theme_suggestions(prefs),
            personalization_score: personalization_score(prefs),
            new_user: prefs.session_count < self.thresholds.new_user_sessions,
            returning_user: prefs.session_count >= self.thresholds.returning_user_sessions,
            power_user: prefs.total_playtime > self.thresholds.power_user_playtime_secs,
        }
    }

    /// Seed config, recommendations, and profile snapshot for one request.
    pub fn generate_personalized_game_config(
        &self,
        user_id: &str,
        description: &str,
        genre: &str,
    ) -> PersonalizedGameConfig {
        let prefs = self.profiles.user_preferences(user_id);
        let seed_config = self
            .seeds
            .generate_unique_seed(user_id, genre, description, prefs.as_ref());
        let recommendations = match &prefs {
            Some(p) => self.recommend(p),
            None => Recommendations::first_contact(),
        };

        debug!(
            user_id = %user_id,
            genre = %genre,
            seed = %seed_config.seed,
            score = recommendations.personalization_score,
            "personalized config generated"
        );

        PersonalizedGameConfig {
            seed_config,
            recommendations,
            user_preferences: prefs,
            personalization_applied: true,
            generation_metadata: GenerationMetadata {
                user_id: user_id.to_string(),
                genre: genre.to_string(),
                description: description.to_string(),
                timestamp: Utc::now().to_rfc3339(),
                personalization_version: PERSONALIZATION_VERSION,
            },
        }
    }

    /// Profile, recommendations, and global analytics for one user, or the
    /// global analytics alone.
    pub fn user_analytics(&self, user_id: Option<&str>) -> UserAnalytics {
        let session_analytics = self.profiles.session_analytics(None);
        match user_id {
            Some(user_id) => UserAnalytics::User {
                preferences: self.profiles.user_preferences(user_id),
                recommendations: self.get_personalized_recommendations(user_id),
                session_analytics,
            },
            None => UserAnalytics::Global(session_analytics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personalization::types::AccessibilityNeeds;
    use std::collections::HashMap;

    struct FixedProfiles(HashMap<String, UserPreferences>);

    impl ProfileReader for FixedProfiles {
        fn user_preferences(&self, user_id: &str) -> Option<UserPreferences> {
            self.0.get(user_id).cloned()
        }

        fn session_analytics(&self, _genre: Option<&str>) -> SessionAnalytics {
            SessionAnalytics::empty()
        }
    }

    fn engine_with(user: &str, prefs: UserPreferences) -> PersonalizationEngine {
        let profiles = FixedProfiles(HashMap::from([(user.to_string(), prefs)]));
        PersonalizationEngine::new(Arc::new(profiles), Arc::new(SeedVarianceEngine::default()))
    }

    #[test]
    fn unknown_user_gets_first_contact_bundle() {
        let engine = engine_with("known", UserPreferences::default());
        let rec = engine.get_personalized_recommendations("stranger");
        assert_eq!(rec, Recommendations::first_contact());
        assert_eq!(rec.suggested_genres, vec!["puzzle", "shooter", "platformer"]);
    }

    #[test]
    fn score_of_fresh_profile_is_zero() {
        assert_eq!(personalization_score(&UserPreferences::default()), 0.0);
    }

    #[test]
    fn score_saturates_at_one() {
        let mut prefs = UserPreferences::default();
        prefs.preferred_genres = (0..5).map(|i| format!("g{i}")).collect();
        prefs.session_count = 100;
        prefs.total_playtime = 100_000;
        prefs.play_style = PlayStyle::Careful;
        prefs.accessibility_needs = AccessibilityNeeds {
            audio_cues: true,
            ..Default::default()
        };
        assert!((personalization_score(&prefs) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn score_grows_with_history() {
        let mut prefs = UserPreferences::default();
        let mut last = personalization_score(&prefs);
        for _ in 0..8 {
            prefs.session_count += 1;
            prefs.total_playtime += 600;
            let next = personalization_score(&prefs);
            assert!(next >= last);
            last = next;
        }
        // both session and playtime weights are capped by now
        assert!((last - 0.5).abs() < 1e-9);
    }

    #[test]
    fn themes_dedupe_and_cap() {
        let mut prefs = UserPreferences::default();
        prefs.preferred_colors = vec!["red".into(), "blue".into()];
        prefs.play_style = PlayStyle::Aggressive;
        assert_eq!(
            theme_suggestions(&prefs),
            vec!["ocean", "sky", "tech", "fire", "energy"]
        );

        prefs.preferred_colors.clear();
        assert_eq!(
            theme_suggestions(&prefs),
            vec!["action", "intense", "competitive"]
        );
    }

    #[test]
    fn user_flags_are_independent() {
        let mut prefs = UserPreferences::default();
        prefs.session_count = 12;
        prefs.total_playtime = 4000;
        prefs.preferred_genres = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let rec = engine_with("u", prefs).get_personalized_recommendations("u");
        assert!(!rec.new_user);
        assert!(rec.returning_user);
        assert!(rec.power_user);
        assert_eq!(rec.suggested_genres, vec!["a", "b", "c"]);
    }

    #[test]
    fn config_bundles_everything() {
        let engine = engine_with("u", UserPreferences::default());
        let config = engine.generate_personalized_game_config("u", "space maze", "puzzle");
        assert!(config.personalization_applied);
        assert!(config.user_preferences.is_some());
        assert_eq!(config.seed_config.genre, "puzzle");
        assert_eq!(config.generation_metadata.personalization_version, "1.0");

        let json = serde_json::to_value(&config).unwrap();
        assert!(json["seed_config"]["color_variance"]["hue_shift"].is_i64());

        let anonymous = engine.generate_personalized_game_config("ghost", "maze", "puzzle");
        assert!(anonymous.user_preferences.is_none());
        assert!(anonymous.recommendations.new_user);
    }

    #[test]
    fn analytics_read_through_profile_reader() {
        let engine = engine_with("u", UserPreferences::default());
        let UserAnalytics::Global(global) = engine.user_analytics(None) else {
            panic!("expected global analytics");
        };
        assert_eq!(global, SessionAnalytics::empty());

        let UserAnalytics::User { preferences, .. } = engine.user_analytics(Some("u")) else {
            panic!("expected per-user analytics");
        };
        assert!(preferences.is_some());
    }
}
