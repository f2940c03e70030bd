//! Parameters shared by the single-session read tools:
//! `session_summary`, `memory_reflect`, `score_feedback`, `validate_memory`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SessionTargetParams {
    #[schemars(description = "Session to inspect. Defaults to the current session.")]
    pub session_id: Option<String>,
}
