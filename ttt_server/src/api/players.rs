//! Player registration and ranking API handlers.
//!
//! # Examples
//!
//! Register a player:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/players \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "alice", "email": "alice@example.com"}'
//! ```
//!
//! Fetch the rankings:
//! ```bash
//! curl http://localhost:8080/api/v1/rankings
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tictactoe::{PlayerName, PlayerRecord, ScoreRecord, ServiceError, db::RegistryError};

use super::{AppState, ErrorResponse, service_error_response};
use crate::metrics;

#[derive(Debug, Deserialize)]
pub struct RegisterPlayerRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub name: String,
    pub email: String,
    pub won: i64,
    pub played: i64,
    pub win_rate: f64,
    pub created_at: String,
}

impl From<&PlayerRecord> for PlayerResponse {
    fn from(record: &PlayerRecord) -> Self {
        Self {
            name: record.name.to_string(),
            email: record.email.clone(),
            won: record.won,
            played: record.played,
            win_rate: record.win_rate(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub game_id: String,
    pub host: String,
    pub guest: String,
    pub host_outcome: String,
    pub guest_outcome: String,
    pub ended_at: String,
}

impl From<&ScoreRecord> for ScoreResponse {
    fn from(score: &ScoreRecord) -> Self {
        Self {
            game_id: score.session_id.to_string(),
            host: score.host.to_string(),
            guest: score.guest.to_string(),
            host_outcome: score.host_outcome.to_string(),
            guest_outcome: score.guest_outcome.to_string(),
            ended_at: score.ended_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RankingEntry {
    pub rank: usize,
    pub name: String,
    pub won: i64,
    pub played: i64,
    pub win_rate: f64,
}

/// Register a new player.
///
/// Names are sanitized (whitespace trimmed and collapsed to underscores)
/// and must be unique, as must email addresses.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "alice",
///   "email": "alice@example.com"
/// }
/// ```
///
/// # Response
///
/// Returns `201 Created` with the new player:
/// ```json
/// {
///   "name": "alice",
///   "email": "alice@example.com",
///   "won": 0,
///   "played": 0,
///   "win_rate": 0.0,
///   "created_at": "2026-08-22T10:30:00+00:00"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty name or malformed email
/// - `409 Conflict`: Name or email already registered
pub async fn register_player(
    State(state): State<AppState>,
    Json(request): Json<RegisterPlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), (StatusCode, Json<ErrorResponse>)> {
    let name = PlayerName::new(&request.name);
    match state.registry.register(&name, &request.email).await {
        Ok(record) => {
            metrics::players_registered_total();
            tracing::info!("registered player {}", record.name);
            Ok((StatusCode::CREATED, Json(PlayerResponse::from(&record))))
        }
        Err(e) => Err(service_error_response(&ServiceError::from(e))),
    }
}

/// Score history for a player, newest first.
///
/// Covers every completed game the player took part in, on either side of
/// the board.
///
/// # Errors
///
/// - `404 Not Found`: No player registered under that name
pub async fn get_player_scores(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ScoreResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let player = PlayerName::new(&name);
    match state.registry.resolve(&player).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(service_error_response(&ServiceError::Registry(
                RegistryError::PlayerNotFound,
            )));
        }
        Err(e) => return Err(service_error_response(&ServiceError::from(e))),
    }

    match state.scores.for_player(&player).await {
        Ok(scores) => Ok(Json(scores.iter().map(ScoreResponse::from).collect())),
        Err(e) => Err(service_error_response(&ServiceError::from(e))),
    }
}

/// Players ranked by win rate, best first.
///
/// Only players with at least one completed game appear.
pub async fn get_rankings(
    State(state): State<AppState>,
) -> Result<Json<Vec<RankingEntry>>, (StatusCode, Json<ErrorResponse>)> {
    match state.registry.rankings().await {
        Ok(players) => {
            let entries = players
                .iter()
                .enumerate()
                .map(|(index, player)| RankingEntry {
                    rank: index + 1,
                    name: player.name.to_string(),
                    won: player.won,
                    played: player.played,
                    win_rate: player.win_rate(),
                })
                .collect();
            Ok(Json(entries))
        }
        Err(e) => Err(service_error_response(&ServiceError::from(e))),
    }
}
