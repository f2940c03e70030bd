//! MCP `log_entry` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters for the `log_entry` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct LogEntryParams {
    /// Session to append to. Defaults to the current session; unknown ids are created.
    #[schemars(
        description = "Session to append to. Defaults to the current session. Unknown ids are created on first write."
    )]
    pub session_id: Option<String>,

    #[schemars(description = "Route (handler name) that produced this interaction")]
    pub route: String,

    #[schemars(description = "Request payload, any JSON value")]
    pub request: Value,

    #[schemars(description = "Response payload, any JSON value")]
    pub response: Value,
}
