//! Session summaries, reflections, and route analytics.
//!
//! Everything here is recomputed from the store on each call; nothing is cached.

use serde::Serialize;
use std::collections::BTreeMap;

use super::feedback::score_entries;
use super::integrity::validate_memory;
use super::types::{Entry, SessionReader};

/// Integrity verdict attached to a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    Valid,
    Corrupted,
}

impl IntegrityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Corrupted => "corrupted",
        }
    }
}

/// Aggregate view of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub session_id: String,
    pub total_entries: usize,
    /// Distinct routes in first-seen order.
    pub routes_used: Vec<String>,
    pub most_used_route: Option<String>,
    pub most_recent_entry: Option<Entry>,
    pub confidence_score: f64,
    pub diversity: usize,
    pub depth: usize,
    pub memory_integrity: IntegrityStatus,
}

/// Result of [`generate_session_summary`]. A missing session is reported as
/// data, never as an error.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SessionSummary {
    Report(SummaryReport),
    NotFound { error: String, session_id: String },
}

/// Display-oriented summary of the current session.
#[derive(Debug, Clone, Serialize)]
pub struct DisplaySummary {
    pub session_id: String,
    pub started: String,
    pub total_entries: usize,
    pub routes_used: Vec<String>,
    pub most_used_route: Option<String>,
    pub last_route: Option<String>,
    /// Confidence formatted as a percentage, e.g. `"125.00%"`.
    pub confidence: String,
    pub integrity: String,
}

/// Self-learning reflection over a run of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reflection {
    pub insight: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

/// Which route dominates a run of entries.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDistribution {
    pub best_route: Option<String>,
    pub route_distribution: BTreeMap<String, usize>,
}

/// Per-route counts in first-seen order.
pub(crate) fn route_counts(entries: &[Entry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in entries {
        let route = entry.route_name();
        match counts.iter_mut().find(|(r, _)| r == route) {
            Some((_, n)) => *n += 1,
            None => counts.push((route.to_string(), 1)),
        }
    }
    counts
}

/// Route with the highest count.
///
/// Ties go to the first route (in first-seen order) that reached the maximum.
/// This tie-break is incidental, not a guarantee callers should rely on.
fn most_used(counts: &[(String, usize)]) -> Option<String> {
    let mut best: Option<&(String, usize)> = None;
    for pair in counts {
        if best.map_or(true, |b| pair.1 > b.1) {
            best = Some(pair);
        }
    }
    best.map(|(route, _)| route.clone())
}

/// Summarise a session: totals, routes, most-used route, latest entry,
/// confidence, and integrity.
pub fn generate_session_summary(reader: &dyn SessionReader, session_id: &str) -> SessionSummary {
    let Some(record) = reader.session(session_id) else {
        return SessionSummary::NotFound {
            error: "Session not found".to_string(),
            session_id: session_id.to_string(),
        };
    };

    let counts = route_counts(&record.entries);
    let feedback = score_entries(&record.entries);
    let integrity = if validate_memory(reader, session_id) {
        IntegrityStatus::Valid
    } else {
        IntegrityStatus::Corrupted
    };

    SessionSummary::Report(SummaryReport {
        session_id: session_id.to_string(),
        total_entries: record.entries.len(),
        most_used_route: most_used(&counts),
        routes_used: counts.into_iter().map(|(route, _)| route).collect(),
        most_recent_entry: record.entries.last().cloned(),
        confidence_score: feedback.confidence_score,
        diversity: feedback.diversity,
        depth: feedback.depth,
        memory_integrity: integrity,
    })
}

/// Summary of the current session, reshaped for display.
pub fn generate_summary(reader: &dyn SessionReader) -> DisplaySummary {
    let session_id = reader.current_session_id();
    let started = reader
        .session(&session_id)
        .map(|r| r.started)
        .unwrap_or_default();

    match generate_session_summary(reader, &session_id) {
        SessionSummary::Report(report) => DisplaySummary {
            session_id,
            started,
            total_entries: report.total_entries,
            routes_used: report.routes_used,
            most_used_route: report.most_used_route,
            last_route: report
                .most_recent_entry
                .and_then(|e| e.route_str().map(str::to_string)),
            confidence: format!("{:.2}%", report.confidence_score),
            integrity: report.memory_integrity.as_str().to_string(),
        },
        SessionSummary::NotFound { .. } => DisplaySummary {
            session_id,
            started,
            total_entries: 0,
            routes_used: Vec::new(),
            most_used_route: None,
            last_route: None,
            confidence: "0.00%".to_string(),
            integrity: IntegrityStatus::Corrupted.as_str().to_string(),
        },
    }
}

pub fn reflect(entries: &[Entry]) -> Reflection {
    let Some(recent) = entries.last() else {
        return Reflection {
            insight: "No data to reflect on.".to_string(),
            recent_action: None,
            confidence: None,
        };
    };
    let routes = route_counts(entries).len();
    Reflection {
        insight: format!("{} entries analyzed across {routes} routes.", entries.len()),
        recent_action: Some(recent.route_name().to_string()),
        confidence: Some("stable".to_string()),
    }
}

pub fn route_distribution(entries: &[Entry]) -> RouteDistribution {
    let counts = route_counts(entries);
    RouteDistribution {
        best_route: most_used(&counts),
        route_distribution: counts.into_iter().collect(),
    }
}
