//! Confidence scoring from session depth and route diversity.

use serde::Serialize;
use std::collections::HashSet;

use super::types::{Entry, SessionReader};

/// Confidence derived from a session's depth and route diversity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedbackScore {
    pub confidence_score: f64,
    pub diversity: usize,
    pub depth: usize,
}

impl FeedbackScore {
    const EMPTY: Self = Self {
        confidence_score: 0.0,
        diversity: 0,
        depth: 0,
    };
}

/// `round((depth + 2 * diversity) / (depth + 1) * 100, 2)`.
///
/// Not capped at 100: a session touching many distinct routes scores above it.
pub fn confidence_score(depth: usize, diversity: usize) -> f64 {
    let raw = (depth as f64 + diversity as f64 * 2.0) / (depth as f64 + 1.0) * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Score over a set of entries; empty input scores 0.0.
pub fn score_entries(entries: &[Entry]) -> FeedbackScore {
    if entries.is_empty() {
        return FeedbackScore::EMPTY;
    }
    let diversity = entries
        .iter()
        .map(Entry::route_name)
        .collect::<HashSet<_>>()
        .len();
    let depth = entries.len();
    FeedbackScore {
        confidence_score: confidence_score(depth, diversity),
        diversity,
        depth,
    }
}

/// Score a session. Absent or empty sessions score 0.0.
pub fn score_feedback(reader: &dyn SessionReader, session_id: &str) -> FeedbackScore {
    match reader.session(session_id) {
        Some(record) => score_entries(&record.entries),
        None => FeedbackScore::EMPTY,
    }
}
