//! MCP `recall_entries` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `recall_entries` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RecallEntriesParams {
    #[schemars(description = "Session to read. Defaults to the current session.")]
    pub session_id: Option<String>,

    /// Only return entries logged under this route.
    #[schemars(description = "Only return entries logged under this route")]
    pub route: Option<String>,
}
