//! MCP `search_entries` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_entries` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchEntriesParams {
    #[schemars(description = "Session to search. Defaults to the current session.")]
    pub session_id: Option<String>,

    /// Text compared against each entry's request payload.
    #[schemars(description = "Text compared against each entry's request payload")]
    pub query: String,

    /// Maximum number of hits. Defaults to `memory.default_top_k`.
    #[schemars(description = "Maximum number of hits (at least 1). Defaults to 5.")]
    pub top_k: Option<usize>,
}
