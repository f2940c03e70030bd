//! MCP `create_user` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `create_user` MCP tool.
///
/// The same address and user agent always map to the same user id.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateUserParams {
    #[schemars(description = "Client network address")]
    pub ip_address: String,

    #[schemars(description = "Client user-agent string. Defaults to empty.")]
    pub user_agent: Option<String>,
}
