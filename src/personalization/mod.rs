//! Per-user personalization for generated games.
//!
//! [`profiles::SessionManager`] tracks user profiles and game sessions and
//! learns preferences when a session ends. [`seed::SeedVarianceEngine`] turns
//! a unique seed into variance multipliers. [`engine::PersonalizationEngine`]
//! combines both into recommendations and full personalized configs.

pub mod engine;
pub mod learning;
pub mod profiles;
pub mod seed;
pub mod types;

pub use engine::PersonalizationEngine;
pub use profiles::SessionManager;
pub use seed::SeedVarianceEngine;
pub use types::{Difficulty, GameOutcome, PlayStyle, ProfileReader, UserPreferences};

use std::time::{SystemTime, UNIX_EPOCH};

/// First `len` hex characters of the MD5 digest of `input`.
pub(crate) fn short_hash(input: &str, len: usize) -> String {
    format!("{:x}", md5::compute(input.as_bytes()))
        .chars()
        .take(len)
        .collect()
}

pub(crate) fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_is_md5_prefix() {
        // md5("abc") = 900150983cd24fb0d6963f7d28e17f72
        assert_eq!(short_hash("abc", 12), "900150983cd2");
        assert_eq!(short_hash("abc", 100).len(), 32);
    }
}
