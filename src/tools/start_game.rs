use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StartGameParams {
    #[schemars(description = "User id from create_user")]
    pub user_id: String,

    #[schemars(description = "Identifier of the generated game")]
    pub game_id: String,

    #[schemars(description = "Game genre, e.g. 'puzzle', 'shooter', 'platformer', 'racing', 'rpg', 'strategy'")]
    pub genre: String,

    #[schemars(description = "Difficulty: 'easy', 'medium', or 'hard'. Defaults to 'medium'.")]
    pub difficulty: Option<String>,
}
