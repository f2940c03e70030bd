//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that build the
//! session, profile, and seed stores once and hand them to every
//! [`MythiqTools`] instance.

use crate::tools::MythiqTools;
use anyhow::Result;
use mythiq::config::MythiqConfig;
use mythiq::memory::SessionStore;
use mythiq::personalization::engine::UserThresholds;
use mythiq::personalization::{PersonalizationEngine, ProfileReader, SeedVarianceEngine, SessionManager};
use rmcp::ServiceExt;
use std::sync::Arc;

/// Stores shared by every tool handler for the life of the process.
#[derive(Clone)]
struct SharedState {
    sessions: Arc<SessionStore>,
    profiles: Arc<SessionManager>,
    personalization: Arc<PersonalizationEngine>,
    config: Arc<MythiqConfig>,
}

impl SharedState {
    fn tools(&self) -> MythiqTools {
        MythiqTools::new(
            self.sessions.clone(),
            self.profiles.clone(),
            self.personalization.clone(),
            self.config.clone(),
        )
    }
}

fn setup_shared_state(config: MythiqConfig) -> SharedState {
    let sessions = Arc::new(SessionStore::with_capacity_limit(config.memory.max_sessions));
    if let Some(max) = config.memory.max_sessions {
        tracing::info!(max_sessions = max, "session store capacity limit enabled");
    }

    let p = &config.personalization;
    let profiles = Arc::new(SessionManager::new(p.max_preferred_genres));
    let seeds = Arc::new(SeedVarianceEngine::new(p.seed_history_limit, p.seed_retry_limit));
    let reader: Arc<dyn ProfileReader> = profiles.clone();
    let personalization = Arc::new(PersonalizationEngine::with_thresholds(
        reader,
        seeds,
        UserThresholds::from(p),
    ));
    tracing::info!("stores ready");

    SharedState {
        sessions,
        profiles,
        personalization,
        config: Arc::new(config),
    }
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: MythiqConfig) -> Result<()> {
    tracing::info!("starting Mythiq MCP server on stdio");

    let state = setup_shared_state(config);
    let transport = rmcp::transport::stdio();

    let server = state.tools().serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over streamable HTTP at `http://host:port/mcp`.
pub async fn serve_http(config: MythiqConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting Mythiq MCP server on HTTP");

    let state = setup_shared_state(config);

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(state.tools()),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
