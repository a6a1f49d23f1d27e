//! LUDARENA Server - realtime tournament coordination
//!
//! This crate provides the network edge:
//! - WebSocket endpoint for players (join, ready, move, leave)
//! - Admin REST API for operators
//! - Static file serving for the admin UI

mod connection;
mod coordinator;
mod protocol;
mod routes;
mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

pub use coordinator::{AdminError, Coordinator, CoordinatorConfig};
pub use protocol::{ClientMessage, ErrorCode, ServerMessage};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    pub coordinator: CoordinatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8010,
            static_dir: "admin-ui".to_string(),
            coordinator: CoordinatorConfig::default(),
        }
    }
}

/// Shared state handed to every route
pub struct ServerState {
    pub coordinator: Arc<Coordinator>,
}

impl ServerState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            coordinator: Coordinator::new(config.coordinator.clone()),
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Player channel
        .route("/ws", get(ws::ws_handler))
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Operator API
        .route(
            "/api/tournaments",
            get(routes::admin::list_tournaments).post(routes::admin::create_tournament),
        )
        .route(
            "/api/tournaments/{id}/bots",
            post(routes::admin::add_bots),
        )
        .route(
            "/api/tournaments/{id}/start",
            post(routes::admin::start_tournament),
        )
        .route(
            "/api/tournaments/{id}/finish",
            post(routes::admin::finish_tournament),
        )
        .route(
            "/api/tournaments/{id}/snapshot",
            get(routes::admin::snapshot_tournament),
        )
        .route(
            "/api/tournaments/restore",
            post(routes::admin::restore_tournament),
        )
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::new(&config));
    let router = create_router(&config, state);

    tracing::info!("ludarena server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
