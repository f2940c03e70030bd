//! MCP `personalized_config` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `personalized_config` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PersonalizedConfigParams {
    #[schemars(description = "User id from create_user. Unknown users get first-contact defaults.")]
    pub user_id: String,

    #[schemars(description = "Free-text description of the game to generate")]
    pub description: String,

    #[schemars(description = "Game genre; known genres apply their own variance rules")]
    pub genre: String,
}
