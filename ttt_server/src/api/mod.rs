//! HTTP API for the game server.
//!
//! REST endpoints over the session manager and repositories. All request
//! and response bodies are JSON; errors come back as `{ "error": "..." }`
//! with a status code mapped from the underlying error.
//!
//! # Modules
//!
//! - [`players`]: Registration, score history, rankings
//! - [`games`]: Game lifecycle (create, inspect, move, forfeit, history)
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                          - Health check
//! POST /api/v1/players                  - Register a player
//! GET  /api/v1/players/{name}/scores    - Score history for a player
//! GET  /api/v1/rankings                 - Players ranked by win rate
//! POST /api/v1/games                    - Start a game
//! GET  /api/v1/games                    - List active games
//! GET  /api/v1/games/{game_id}          - Game snapshot
//! PUT  /api/v1/games/{game_id}/move     - Claim a cell
//! PUT  /api/v1/games/{game_id}/forfeit  - Surrender the game
//! GET  /api/v1/games/{game_id}/history  - Ordered move log
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod games;
pub mod players;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tictactoe::{
    GameError, ServiceError, SessionManager,
    db::{PlayerRegistry, RegistryError, ScoreHistory, SessionStore},
};
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; every field is an `Arc` or an `Arc`-backed handle,
/// so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Routes game requests to session actors
    pub manager: SessionManager,
    /// Player registration and ranking aggregates
    pub registry: Arc<dyn PlayerRegistry>,
    /// Per-game score records
    pub scores: Arc<dyn ScoreHistory>,
    /// Session persistence, used directly only by the health check
    pub store: Arc<dyn SessionStore>,
}

/// Error body returned by every endpoint on failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    let root_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", v1_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API v1 router with all versioned endpoints.
///
/// Versioning leaves room for future evolution without breaking existing
/// clients.
fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/players", post(players::register_player))
        .route("/players/{name}/scores", get(players::get_player_scores))
        .route("/rankings", get(players::get_rankings))
        .route(
            "/games",
            post(games::create_game).get(games::list_active_games),
        )
        .route("/games/{game_id}", get(games::get_game))
        .route("/games/{game_id}/move", put(games::make_move))
        .route("/games/{game_id}/forfeit", put(games::forfeit_game))
        .route("/games/{game_id}/history", get(games::get_game_history))
}

/// Maps a service error to an HTTP status and a client-safe body.
///
/// Database failures are sanitized; rule rejections go out verbatim.
pub(crate) fn service_error_response(error: &ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match error {
        ServiceError::SessionNotFound => StatusCode::NOT_FOUND,
        ServiceError::Game(game) => match game {
            GameError::NotParticipant => StatusCode::FORBIDDEN,
            GameError::SessionCompleted
            | GameError::OutOfTurn
            | GameError::InvalidState
            | GameError::DuplicateSession => StatusCode::CONFLICT,
            GameError::InvalidMove { .. } => StatusCode::BAD_REQUEST,
            GameError::InsufficientParticipants => StatusCode::NOT_FOUND,
        },
        ServiceError::Registry(registry) => match registry {
            RegistryError::PlayerNotFound => StatusCode::NOT_FOUND,
            RegistryError::NameTaken | RegistryError::EmailTaken => StatusCode::CONFLICT,
            RegistryError::InvalidEmail | RegistryError::InvalidName => StatusCode::BAD_REQUEST,
            RegistryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        ServiceError::Store(_) | ServiceError::ChannelClosed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match error {
        ServiceError::Registry(registry) => registry.client_message(),
        ServiceError::Store(store) => store.client_message(),
        other => other.to_string(),
    };

    (status, Json(ErrorResponse { error: message }))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Probes the session store and reports the live actor count. Returns
/// `200 OK` when storage answers, `503 Service Unavailable` otherwise.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","database":true,"games":{"live_count":2},...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = state.store.ping().await.is_ok();
    let live_games = state.manager.live_session_count().await;

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "games": {
            "live_count": live_games,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
