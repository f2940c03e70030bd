//! Read path: entry retrieval, similarity search, and history overlays.

use serde::Serialize;

use super::types::{Entry, SessionReader};

/// A search hit: the entry plus its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub entry: Entry,
    pub score: f64,
}

/// Entries of a session in append order, optionally limited to one route.
/// Unknown sessions yield an empty list.
pub fn retrieve_entries(
    reader: &dyn SessionReader,
    session_id: &str,
    route_filter: Option<&str>,
) -> Vec<Entry> {
    let Some(record) = reader.session(session_id) else {
        return Vec::new();
    };
    match route_filter {
        Some(route) => record
            .entries
            .into_iter()
            .filter(|e| e.route_str() == Some(route))
            .collect(),
        None => record.entries,
    }
}

/// Character-level similarity ratio in `[0.0, 1.0]`: twice the matched
/// characters over the combined length. Two empty strings score 1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    similar::TextDiff::from_chars(a, b).ratio() as f64
}

/// Rank a session's entries by similarity between `query` and each request.
///
/// Returns at most `top_k` hits, best first. Equal scores keep append order.
pub fn semantic_search(
    reader: &dyn SessionReader,
    session_id: &str,
    query: &str,
    top_k: usize,
) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = retrieve_entries(reader, session_id, None)
        .into_iter()
        .map(|entry| {
            let score = similarity_ratio(query, &entry.request_text());
            SearchHit { entry, score }
        })
        .collect();

    // sort_by is stable
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    hits.truncate(top_k);
    hits
}

/// The last `limit` entries rendered as `"<route>: <request>"` lines.
pub fn recent_history(reader: &dyn SessionReader, session_id: &str, limit: usize) -> Vec<String> {
    let entries = retrieve_entries(reader, session_id, None);
    let skip = entries.len().saturating_sub(limit);
    entries
        .iter()
        .skip(skip)
        .map(|e| format!("{}: {}", e.route_name(), e.request_text()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::entries::log_entry;
    use crate::memory::sessions::SessionStore;
    use serde_json::json;

    fn seeded_store() -> (SessionStore, String) {
        let store = SessionStore::new();
        let id = store.start_session();
        log_entry(&store, &id, "story", json!("tell me a story about dragons"), json!("..."));
        log_entry(&store, &id, "math", json!("what is 12 times 7"), json!(84));
        log_entry(&store, &id, "story", json!("tell me a story about ships"), json!("..."));
        (store, id)
    }

    #[test]
    fn retrieve_all_and_filtered() {
        let (store, id) = seeded_store();
        assert_eq!(retrieve_entries(&store, &id, None).len(), 3);

        let stories = retrieve_entries(&store, &id, Some("story"));
        assert_eq!(stories.len(), 2);
        assert!(stories.iter().all(|e| e.route_name() == "story"));
    }

    #[test]
    fn retrieve_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(retrieve_entries(&store, "nope", None).is_empty());
        assert!(semantic_search(&store, "nope", "anything", 5).is_empty());
    }

    #[test]
    fn search_ranks_closest_request_first() {
        let (store, id) = seeded_store();
        let hits = semantic_search(&store, &id, "what is 12 times 8", 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entry.route_name(), "math");
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn search_ties_keep_append_order() {
        let store = SessionStore::new();
        let id = store.start_session();
        log_entry(&store, &id, "a", json!("same"), json!(1));
        log_entry(&store, &id, "b", json!("same"), json!(2));
        log_entry(&store, &id, "c", json!("same"), json!(3));

        let hits = semantic_search(&store, &id, "same", 5);
        let routes: Vec<&str> = hits.iter().map(|h| h.entry.route_name()).collect();
        assert_eq!(routes, vec!["a", "b", "c"]);
        assert!(hits.iter().all(|h| h.score == 1.0));
    }

    #[test]
    fn ratio_bounds() {
        assert_eq!(similarity_ratio("weather today", "weather today"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert_eq!(similarity_ratio("abc", ""), 0.0);
    }

    #[test]
    fn closer_strings_rank_higher() {
        let query = "tell me a story";
        let near = similarity_ratio(query, "tell me a story about dragons");
        let far = similarity_ratio(query, "convert 10 usd to eur");
        assert!(near > far);
    }

    #[test]
    fn empty_query_scores_zero_not_error() {
        let (store, id) = seeded_store();
        let hits = semantic_search(&store, &id, "", 5);
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.score == 0.0));
        let routes: Vec<&str> = hits.iter().map(|h| h.entry.route_name()).collect();
        assert_eq!(routes, vec!["story", "math", "story"]);
    }

    #[test]
    fn recent_history_takes_tail() {
        let (store, id) = seeded_store();
        let lines = recent_history(&store, &id, 2);
        assert_eq!(
            lines,
            vec![
                "math: what is 12 times 7".to_string(),
                "story: tell me a story about ships".to_string(),
            ]
        );
    }
}
