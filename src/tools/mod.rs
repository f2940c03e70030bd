pub mod create_user;
pub mod end_game;
pub mod log_entry;
pub mod personalized_config;
pub mod recall_entries;
pub mod search_entries;
pub mod seed_stats;
pub mod session_target;
pub mod start_game;
pub mod user_analytics;

use create_user::CreateUserParams;
use end_game::EndGameParams;
use log_entry::LogEntryParams;
use personalized_config::PersonalizedConfigParams;
use recall_entries::RecallEntriesParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use search_entries::SearchEntriesParams;
use seed_stats::SeedStatsParams;
use serde::Serialize;
use session_target::SessionTargetParams;
use start_game::StartGameParams;
use std::sync::Arc;
use user_analytics::UserAnalyticsParams;

use mythiq::config::MythiqConfig;
use mythiq::error::MythiqError;
use mythiq::memory::{entries, feedback, integrity, recall, stats, summary, SessionStore};
use mythiq::personalization::{
    Difficulty, GameOutcome, PersonalizationEngine, SessionManager,
};

fn invalid(field: &'static str, reason: &str) -> String {
    MythiqError::InvalidParameter {
        field,
        reason: reason.to_string(),
    }
    .to_string()
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

/// The Mythiq MCP tool handler. Holds the shared stores and config and
/// exposes session memory and personalization via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct MythiqTools {
    tool_router: ToolRouter<Self>,
    sessions: Arc<SessionStore>,
    profiles: Arc<SessionManager>,
    personalization: Arc<PersonalizationEngine>,
    config: Arc<MythiqConfig>,
}

impl MythiqTools {
    fn session_or_current(&self, session_id: Option<String>) -> String {
        session_id.unwrap_or_else(|| self.sessions.current_session().session_id)
    }
}

#[tool_router]
impl MythiqTools {
    pub fn new(
        sessions: Arc<SessionStore>,
        profiles: Arc<SessionManager>,
        personalization: Arc<PersonalizationEngine>,
        config: Arc<MythiqConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            sessions,
            profiles,
            personalization,
            config,
        }
    }

    #[tool(description = "Start a new empty memory session and return its id.")]
    async fn start_session(&self) -> Result<String, String> {
        let session_id = self.sessions.start_session();
        Ok(serde_json::json!({ "session_id": session_id }).to_string())
    }

    #[tool(description = "Return the current (most recently started) session and its metadata, creating one if none exist.")]
    async fn current_session(&self) -> Result<String, String> {
        to_json(&self.sessions.current_session())
    }

    #[tool(description = "Append a request/response interaction to a session's memory. Returns the stored entry.")]
    async fn log_entry(
        &self,
        Parameters(params): Parameters<LogEntryParams>,
    ) -> Result<String, String> {
        if params.route.trim().is_empty() {
            return Err(invalid("route", "must not be empty"));
        }
        let session_id = self.session_or_current(params.session_id);
        tracing::info!(session_id = %session_id, route = %params.route, "log_entry called");

        let entry = entries::log_entry(
            self.sessions.as_ref(),
            &session_id,
            &params.route,
            params.request,
            params.response,
        );
        to_json(&entry)
    }

    #[tool(description = "List a session's entries in logging order, optionally filtered to one route. Unknown sessions yield an empty list.")]
    async fn recall_entries(
        &self,
        Parameters(params): Parameters<RecallEntriesParams>,
    ) -> Result<String, String> {
        let session_id = self.session_or_current(params.session_id);
        let found = recall::retrieve_entries(self.sessions.as_ref(), &session_id, params.route.as_deref());
        Ok(serde_json::json!({
            "session_id": session_id,
            "total": found.len(),
            "entries": found,
        })
        .to_string())
    }

    #[tool(description = "Rank a session's entries by text similarity between the query and each request payload.")]
    async fn search_entries(
        &self,
        Parameters(params): Parameters<SearchEntriesParams>,
    ) -> Result<String, String> {
        let top_k = params.top_k.unwrap_or(self.config.memory.default_top_k);
        if top_k == 0 {
            return Err(invalid("top_k", "must be at least 1"));
        }
        let session_id = self.session_or_current(params.session_id);
        tracing::info!(session_id = %session_id, top_k, "search_entries called");

        let hits = recall::semantic_search(self.sessions.as_ref(), &session_id, &params.query, top_k);
        Ok(serde_json::json!({
            "session_id": session_id,
            "results": hits,
        })
        .to_string())
    }

    #[tool(description = "Summarise a session: entry count, routes used, most used route, latest entry, confidence, and integrity. Without a session id, returns a display summary of the current session.")]
    async fn session_summary(
        &self,
        Parameters(params): Parameters<SessionTargetParams>,
    ) -> Result<String, String> {
        match params.session_id {
            Some(session_id) => to_json(&summary::generate_session_summary(
                self.sessions.as_ref(),
                &session_id,
            )),
            None => to_json(&summary::generate_summary(self.sessions.as_ref())),
        }
    }

    #[tool(description = "Reflect on a session: an insight line, the per-route distribution, and the most recent interactions.")]
    async fn memory_reflect(
        &self,
        Parameters(params): Parameters<SessionTargetParams>,
    ) -> Result<String, String> {
        let session_id = self.session_or_current(params.session_id);
        let reader = self.sessions.as_ref();
        let found = recall::retrieve_entries(reader, &session_id, None);
        Ok(serde_json::json!({
            "session_id": session_id,
            "reflection": summary::reflect(&found),
            "routes": summary::route_distribution(&found),
            "recent_history": recall::recent_history(reader, &session_id, self.config.memory.history_window),
        })
        .to_string())
    }

    #[tool(description = "Score a session's confidence from its depth (entry count) and diversity (distinct routes).")]
    async fn score_feedback(
        &self,
        Parameters(params): Parameters<SessionTargetParams>,
    ) -> Result<String, String> {
        let session_id = self.session_or_current(params.session_id);
        to_json(&feedback::score_feedback(self.sessions.as_ref(), &session_id))
    }

    #[tool(description = "Check that a session exists and every entry carries route, request, response, and timestamp.")]
    async fn validate_memory(
        &self,
        Parameters(params): Parameters<SessionTargetParams>,
    ) -> Result<String, String> {
        let session_id = self.session_or_current(params.session_id);
        let valid = integrity::validate_memory(self.sessions.as_ref(), &session_id);
        Ok(serde_json::json!({ "session_id": session_id, "valid": valid }).to_string())
    }

    #[tool(description = "Get session memory statistics: session and entry counts, per-route counts, integrity, and session start range.")]
    async fn memory_stats(&self) -> Result<String, String> {
        to_json(&stats::memory_stats(self.sessions.as_ref()))
    }

    #[tool(description = "Derive a stable user id from client identity and create a default profile on first sight.")]
    async fn create_user(
        &self,
        Parameters(params): Parameters<CreateUserParams>,
    ) -> Result<String, String> {
        let user_agent = params.user_agent.unwrap_or_default();
        let user_id = self.profiles.create_user_session(&params.ip_address, &user_agent);
        Ok(serde_json::json!({ "user_id": user_id }).to_string())
    }

    #[tool(description = "Start a game session for a user and mark it active. Difficulty: easy, medium (default), or hard.")]
    async fn start_game(
        &self,
        Parameters(params): Parameters<StartGameParams>,
    ) -> Result<String, String> {
        let difficulty: Difficulty = match params.difficulty.as_deref() {
            Some(d) => d.parse().map_err(|e: MythiqError| e.to_string())?,
            None => Difficulty::default(),
        };
        let session_id = self.profiles.start_game_session(
            &params.user_id,
            &params.game_id,
            &params.genre,
            difficulty,
        );
        Ok(serde_json::json!({ "session_id": session_id }).to_string())
    }

    #[tool(description = "End a game session and learn the user's preferences from it. Unknown or already-ended sessions are left unchanged.")]
    async fn end_game(
        &self,
        Parameters(params): Parameters<EndGameParams>,
    ) -> Result<String, String> {
        let outcome = GameOutcome {
            score: params.score.unwrap_or(0),
            completed: params.completed.unwrap_or(false),
            actions_taken: params.actions_taken.unwrap_or(0),
        };
        let ended = self.profiles.end_game_session(&params.session_id, outcome);
        Ok(serde_json::json!({
            "session_id": params.session_id,
            "ended": ended,
            "session": self.profiles.game_session(&params.session_id),
        })
        .to_string())
    }

    #[tool(description = "Generate a personalized game configuration: unique seed with variance multipliers, recommendations, and the user's profile.")]
    async fn personalized_config(
        &self,
        Parameters(params): Parameters<PersonalizedConfigParams>,
    ) -> Result<String, String> {
        if params.genre.trim().is_empty() {
            return Err(invalid("genre", "must not be empty"));
        }
        tracing::info!(user_id = %params.user_id, genre = %params.genre, "personalized_config called");
        let config = self.personalization.generate_personalized_game_config(
            &params.user_id,
            &params.description,
            &params.genre,
        );
        to_json(&config)
    }

    #[tool(description = "Get a user's profile and recommendations alongside global game session analytics, or global analytics alone.")]
    async fn user_analytics(
        &self,
        Parameters(params): Parameters<UserAnalyticsParams>,
    ) -> Result<String, String> {
        to_json(&self.personalization.user_analytics(params.user_id.as_deref()))
    }

    #[tool(description = "Get seed generation statistics for a user, a genre, or globally.")]
    async fn seed_stats(
        &self,
        Parameters(params): Parameters<SeedStatsParams>,
    ) -> Result<String, String> {
        to_json(
            &self
                .personalization
                .seeds()
                .get_seed_statistics(params.user_id.as_deref(), params.genre.as_deref()),
        )
    }
}

#[tool_handler]
impl ServerHandler for MythiqTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Mythiq keeps session memory and per-user game personalization. Use log_entry \
                 and recall_entries for session memory, session_summary to review a session, \
                 and create_user, start_game, end_game, and personalized_config for games."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
