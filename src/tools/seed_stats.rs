//! MCP `seed_stats` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `seed_stats` MCP tool.
///
/// A user with seed history wins over a genre; with neither, global stats are returned.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SeedStatsParams {
    #[schemars(description = "User to report on")]
    pub user_id: Option<String>,

    #[schemars(description = "Genre to report on when no user is given")]
    pub genre: Option<String>,
}
