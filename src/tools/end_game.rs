//! MCP `end_game` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `end_game` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EndGameParams {
    #[schemars(description = "Game session id from start_game")]
    pub session_id: String,

    #[schemars(description = "Final score. Defaults to 0.")]
    pub score: Option<i64>,

    #[schemars(description = "Whether the player finished the game. Defaults to false.")]
    pub completed: Option<bool>,

    #[schemars(description = "Number of player actions during the session. Defaults to 0.")]
    pub actions_taken: Option<u32>,
}
