//! Typed failures at the library boundary.
//!
//! Core store operations never fail: misses come back as `None`, `false`, or
//! zeroed scores. These variants cover parsing caller input and restoring
//! snapshots, where rejecting bad data is the right answer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MythiqError {
    #[error("unknown difficulty: {0} (expected easy, medium, or hard)")]
    UnknownDifficulty(String),

    #[error("unknown play style: {0} (expected aggressive, careful, or balanced)")]
    UnknownPlayStyle(String),

    #[error("invalid session snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

impl From<serde_json::Error> for MythiqError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidSnapshot(err.to_string())
    }
}
