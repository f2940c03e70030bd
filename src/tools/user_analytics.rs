use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UserAnalyticsParams {
    #[schemars(
        description = "User to report on. Omit for global game session analytics only."
    )]
    pub user_id: Option<String>,
}
