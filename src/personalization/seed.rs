//! Seed-variance generation for per-game personalization.
//!
//! Each game request gets a short seed token. The token seeds a deterministic
//! RNG that draws visual, mechanics, layout, and audio multipliers; user
//! preferences and genre floors are then applied on top of the draw.
//!
//! Seeds are kept unique per user against a rolling history. When the retry
//! budget runs out a colliding seed is accepted rather than failing the request.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::types::{PlayStyle, UserPreferences};
use super::{short_hash, unix_nanos};

pub const SEED_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorVariance {
    /// Degrees, drawn from ±30.
    pub hue_shift: i32,
    pub saturation_multiplier: f64,
    pub brightness_multiplier: f64,
    pub contrast_boost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MechanicsVariance {
    pub speed_multiplier: f64,
    pub difficulty_modifier: f64,
    pub spawn_rate_modifier: f64,
    pub score_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutVariance {
    pub element_count_modifier: f64,
    pub spacing_modifier: f64,
    pub size_variance: f64,
    pub position_jitter: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioVariance {
    pub pitch_shift: f64,
    pub tempo_modifier: f64,
    pub reverb_amount: f64,
    pub volume_modifier: f64,
}

/// The four multiplier groups drawn from one seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceSet {
    pub color_variance: ColorVariance,
    pub mechanics_variance: MechanicsVariance,
    pub layout_variance: LayoutVariance,
    pub audio_variance: AudioVariance,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedVarianceConfig {
    pub seed: String,
    pub genre: String,
    pub user_id: String,
    pub generation_time: String,
    /// `false` when the retry budget ran out and the seed repeats a recent one.
    pub unique: bool,
    #[serde(flatten)]
    pub variance: VarianceSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeedStatistics {
    User {
        user_total_seeds: usize,
        user_unique_seeds: usize,
        user_variety_score: f64,
    },
    Genre {
        genre_total_seeds: usize,
        genre_unique_seeds: usize,
    },
    Global {
        total_seeds_generated: usize,
        total_unique_seeds: usize,
        global_variety_score: f64,
        active_users: usize,
        genres_with_seeds: usize,
    },
}

/// Map a seed token to RNG state. Same token, same stream.
fn rng_for(seed: &str) -> StdRng {
    let digest = md5::compute(seed.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.0[..8]);
    StdRng::seed_from_u64(u64::from_le_bytes(bytes))
}

/// Draw the raw multipliers for a seed token.
///
/// Draw order is fixed (color, mechanics, layout, audio; fields in
/// declaration order), so identical tokens give identical sets.
pub fn draw_variance(seed: &str) -> VarianceSet {
    let mut rng = rng_for(seed);
    VarianceSet {
        color_variance: ColorVariance {
            hue_shift: rng.random_range(-30..=30),
            saturation_multiplier: rng.random_range(0.8..=1.2),
            brightness_multiplier: rng.random_range(0.9..=1.1),
            contrast_boost: rng.random_range(0.9..=1.1),
        },
        mechanics_variance: MechanicsVariance {
            speed_multiplier: rng.random_range(0.8..=1.2),
            difficulty_modifier: rng.random_range(0.9..=1.1),
            spawn_rate_modifier: rng.random_range(0.8..=1.2),
            score_multiplier: rng.random_range(0.9..=1.1),
        },
        layout_variance: LayoutVariance {
            element_count_modifier: rng.random_range(0.8..=1.2),
            spacing_modifier: rng.random_range(0.9..=1.1),
            size_variance: rng.random_range(0.9..=1.1),
            position_jitter: rng.random_range(0.0..=10.0),
        },
        audio_variance: AudioVariance {
            pitch_shift: rng.random_range(0.9..=1.1),
            tempo_modifier: rng.random_range(0.95..=1.05),
            reverb_amount: rng.random_range(0.0..=0.3),
            volume_modifier: rng.random_range(0.8..=1.0),
        },
    }
}

/// Adjust a draw toward a user's stated and learned preferences.
pub fn apply_user_preferences(variance: &mut VarianceSet, prefs: &UserPreferences) {
    let VarianceSet {
        color_variance: color,
        mechanics_variance: mechanics,
        layout_variance: layout,
        audio_variance: audio,
    } = variance;

    mechanics.difficulty_modifier *= prefs.preferred_difficulty.multiplier();

    if prefs.prefers_color("blue") {
        color.hue_shift += 10;
    } else if prefs.prefers_color("red") {
        color.hue_shift -= 10;
    }

    let needs = prefs.accessibility_needs;
    if needs.high_contrast {
        color.contrast_boost = 1.3;
        color.saturation_multiplier = 1.2;
    }
    if needs.large_text {
        layout.size_variance = 1.2;
    }
    if needs.reduced_motion {
        mechanics.speed_multiplier *= 0.8;
        audio.tempo_modifier *= 0.9;
    }

    match prefs.play_style {
        PlayStyle::Aggressive => {
            mechanics.speed_multiplier *= 1.1;
            mechanics.spawn_rate_modifier *= 1.1;
        }
        PlayStyle::Careful => {
            mechanics.speed_multiplier *= 0.9;
            layout.spacing_modifier *= 1.1;
        }
        PlayStyle::Balanced => {}
    }
}

/// Genre rules: floors raise a value to at least the floor, boosts scale it.
/// Unknown genres are left as drawn.
pub fn apply_genre_variance(variance: &mut VarianceSet, genre: &str) {
    let VarianceSet {
        color_variance: color,
        mechanics_variance: mechanics,
        layout_variance: layout,
        audio_variance: audio,
    } = variance;

    match genre {
        "puzzle" => {
            layout.spacing_modifier = layout.spacing_modifier.max(0.95);
            color.contrast_boost = color.contrast_boost.max(1.0);
        }
        "shooter" => {
            color.contrast_boost *= 1.1;
            mechanics.speed_multiplier = mechanics.speed_multiplier.max(1.0);
        }
        "platformer" => {
            color.saturation_multiplier *= 1.1;
            layout.spacing_modifier = layout.spacing_modifier.max(1.0);
        }
        "racing" => {
            mechanics.speed_multiplier *= 1.1;
            audio.tempo_modifier *= 1.05;
        }
        "rpg" => {
            color.saturation_multiplier *= 1.1;
            layout.element_count_modifier *= 1.1;
        }
        "strategy" => {
            layout.spacing_modifier = layout.spacing_modifier.max(1.0);
            color.contrast_boost = color.contrast_boost.max(1.0);
        }
        _ => {}
    }
}

#[derive(Default)]
struct SeedState {
    /// user -> recent seeds, oldest first
    history: HashMap<String, VecDeque<String>>,
    genre_seeds: BTreeMap<String, HashSet<String>>,
}

pub struct SeedVarianceEngine {
    state: Mutex<SeedState>,
    history_limit: usize,
    retry_limit: usize,
}

impl Default for SeedVarianceEngine {
    fn default() -> Self {
        Self::new(50, 10)
    }
}

impl SeedVarianceEngine {
    pub fn new(history_limit: usize, retry_limit: usize) -> Self {
        Self {
            state: Mutex::new(SeedState::default()),
            history_limit,
            retry_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SeedState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("seed history lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Generate a seed for this user and derive its variance config.
    pub fn generate_unique_seed(
        &self,
        user_id: &str,
        genre: &str,
        description: &str,
        prefs: Option<&UserPreferences>,
    ) -> SeedVarianceConfig {
        self.generate_unique_seed_at(user_id, genre, description, prefs, unix_nanos())
    }

    /// As [`generate_unique_seed`](Self::generate_unique_seed) with the hash
    /// time supplied by the caller.
    pub fn generate_unique_seed_at(
        &self,
        user_id: &str,
        genre: &str,
        description: &str,
        prefs: Option<&UserPreferences>,
        now_nanos: u128,
    ) -> SeedVarianceConfig {
        let (seed, unique) = self.claim_seed(user_id, genre, description, now_nanos);

        let mut variance = draw_variance(&seed);
        if let Some(prefs) = prefs {
            apply_user_preferences(&mut variance, prefs);
        }
        apply_genre_variance(&mut variance, genre);

        SeedVarianceConfig {
            seed,
            genre: genre.to_string(),
            user_id: user_id.to_string(),
            generation_time: Utc::now().to_rfc3339(),
            unique,
            variance,
        }
    }

    /// Pick a seed not in the user's recent history (within the retry
    /// budget) and record it.
    fn claim_seed(&self, user_id: &str, genre: &str, description: &str, now_nanos: u128) -> (String, bool) {
        let mut state = self.lock();
        let history = state.history.entry(user_id.to_string()).or_default();

        let mut seed = short_hash(&format!("{description}_{genre}_{now_nanos}"), SEED_LEN);
        let mut attempt = 0;
        while history.contains(&seed) && attempt < self.retry_limit {
            seed = short_hash(
                &format!("{description}_{genre}_{now_nanos}_{attempt}"),
                SEED_LEN,
            );
            attempt += 1;
        }

        let unique = !history.contains(&seed);
        if unique {
            debug!(user_id = %user_id, genre = %genre, seed = %seed, attempt, "seed generated");
        } else {
            warn!(user_id = %user_id, genre = %genre, seed = %seed, "seed retry budget exhausted, reusing seed");
        }

        history.push_back(seed.clone());
        while history.len() > self.history_limit {
            history.pop_front();
        }
        state
            .genre_seeds
            .entry(genre.to_string())
            .or_default()
            .insert(seed.clone());

        (seed, unique)
    }

    /// Recent seeds for a user, oldest first.
    pub fn seed_history(&self, user_id: &str) -> Vec<String> {
        self.lock()
            .history
            .get(user_id)
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Per-user statistics when the user has history, else per-genre when the
    /// genre has seeds, else global.
    pub fn get_seed_statistics(&self, user_id: Option<&str>, genre: Option<&str>) -> SeedStatistics {
        let state = self.lock();

        if let Some(seeds) = user_id.and_then(|u| state.history.get(u)) {
            let unique = seeds.iter().collect::<HashSet<_>>().len();
            return SeedStatistics::User {
                user_total_seeds: seeds.len(),
                user_unique_seeds: unique,
                user_variety_score: ratio(unique, seeds.len()),
            };
        }

        if let Some(seeds) = genre.and_then(|g| state.genre_seeds.get(g)) {
            return SeedStatistics::Genre {
                genre_total_seeds: seeds.len(),
                genre_unique_seeds: seeds.len(),
            };
        }

        let total: usize = state.history.values().map(VecDeque::len).sum();
        let unique = state
            .history
            .values()
            .flatten()
            .collect::<HashSet<_>>()
            .len();
        SeedStatistics::Global {
            total_seeds_generated: total,
            total_unique_seeds: unique,
            global_variety_score: ratio(unique, total),
            active_users: state.history.len(),
            genres_with_seeds: state.genre_seeds.len(),
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
