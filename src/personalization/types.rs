//! Personalization-domain types.
//!
//! [`UserPreferences`] is the learned per-user profile, [`GameSession`] one
//! play-through, and [`ProfileReader`] the read interface the
//! personalization engine depends on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::MythiqError;

/// Difficulty tier for a game session or preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Scale applied to the drawn difficulty modifier.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Easy => 0.8,
            Self::Medium => 1.0,
            Self::Hard => 1.2,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = MythiqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(MythiqError::UnknownDifficulty(s.to_string())),
        }
    }
}

/// How a player tends to play, classified from actions per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayStyle {
    /// More than 30 actions per minute.
    Aggressive,
    /// Fewer than 10 actions per minute.
    Careful,
    #[default]
    Balanced,
}

impl PlayStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Careful => "careful",
            Self::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for PlayStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlayStyle {
    type Err = MythiqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggressive" => Ok(Self::Aggressive),
            "careful" => Ok(Self::Careful),
            "balanced" => Ok(Self::Balanced),
            _ => Err(MythiqError::UnknownPlayStyle(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AccessibilityNeeds {
    pub high_contrast: bool,
    pub large_text: bool,
    pub reduced_motion: bool,
    pub audio_cues: bool,
}

impl AccessibilityNeeds {
    pub fn any(&self) -> bool {
        self.high_contrast || self.large_text || self.reduced_motion || self.audio_cues
    }
}

/// Learned per-user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Most preferred first, capped by the learning step.
    pub preferred_genres: Vec<String>,
    pub preferred_difficulty: Difficulty,
    pub preferred_colors: Vec<String>,
    pub accessibility_needs: AccessibilityNeeds,
    pub play_style: PlayStyle,
    pub favorite_mechanics: Vec<String>,
    pub session_count: u32,
    /// Cumulative playtime in seconds.
    pub total_playtime: u64,
    /// RFC 3339 timestamp of the last session start.
    pub last_active: String,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            preferred_genres: Vec::new(),
            preferred_difficulty: Difficulty::Medium,
            preferred_colors: vec!["blue".into(), "green".into()],
            accessibility_needs: AccessibilityNeeds::default(),
            play_style: PlayStyle::Balanced,
            favorite_mechanics: Vec::new(),
            session_count: 0,
            total_playtime: 0,
            last_active: Utc::now().to_rfc3339(),
        }
    }
}

impl UserPreferences {
    pub fn prefers_color(&self, color: &str) -> bool {
        self.preferred_colors.iter().any(|c| c == color)
    }
}

/// Partial manual update of a profile. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceUpdate {
    pub preferred_genres: Option<Vec<String>>,
    pub preferred_difficulty: Option<Difficulty>,
    pub preferred_colors: Option<Vec<String>>,
    pub accessibility_needs: Option<AccessibilityNeeds>,
    pub play_style: Option<PlayStyle>,
    pub favorite_mechanics: Option<Vec<String>>,
}

impl PreferenceUpdate {
    pub fn apply_to(self, profile: &mut UserPreferences) {
        if let Some(genres) = self.preferred_genres {
            profile.preferred_genres = genres;
        }
        if let Some(difficulty) = self.preferred_difficulty {
            profile.preferred_difficulty = difficulty;
        }
        if let Some(colors) = self.preferred_colors {
            profile.preferred_colors = colors;
        }
        if let Some(needs) = self.accessibility_needs {
            profile.accessibility_needs = needs;
        }
        if let Some(style) = self.play_style {
            profile.play_style = style;
        }
        if let Some(mechanics) = self.favorite_mechanics {
            profile.favorite_mechanics = mechanics;
        }
    }
}

/// One play-through. Open until `end_time` is set, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub session_id: String,
    pub user_id: String,
    pub game_id: String,
    pub genre: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds between start and end.
    pub duration: u64,
    pub score: i64,
    pub completed: bool,
    pub difficulty: Difficulty,
    pub actions_taken: u32,
    /// What the learning step changed, keyed by preference name.
    pub preferences_learned: BTreeMap<String, serde_json::Value>,
}

impl GameSession {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// How a game session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameOutcome {
    pub score: i64,
    pub completed: bool,
    pub actions_taken: u32,
}

/// Aggregates over ended game sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionAnalytics {
    pub total_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_sessions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_playtime: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_playtime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres_played: Option<Vec<String>>,
}

impl SessionAnalytics {
    /// No ended sessions: serializes as `{"total_sessions": 0}`.
    pub fn empty() -> Self {
        Self {
            total_sessions: 0,
            completed_sessions: None,
            completion_rate: None,
            total_playtime: None,
            avg_playtime: None,
            avg_score: None,
            genres_played: None,
        }
    }
}

/// Read access to user profiles and the game history behind them.
pub trait ProfileReader: Send + Sync {
    fn user_preferences(&self, user_id: &str) -> Option<UserPreferences>;

    /// Aggregates over ended sessions for one genre, or all genres.
    fn session_analytics(&self, genre: Option<&str>) -> SessionAnalytics;
}
