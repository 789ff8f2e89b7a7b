//! Game lifecycle API handlers.
//!
//! Create games, inspect them, claim cells, surrender, and read the move
//! log. Mutations are routed through the session manager so each game's
//! actor serializes them.
//!
//! # Examples
//!
//! Start a game:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/games \
//!   -H "Content-Type: application/json" \
//!   -d '{"host": "alice", "guest": "bob"}'
//! ```
//!
//! Claim a cell:
//! ```bash
//! curl -X PUT http://localhost:8080/api/v1/games/GAME_ID/move \
//!   -H "Content-Type: application/json" \
//!   -d '{"player": "bob", "cell": 5}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tictactoe::{Completion, MoveRecord, PlayerName, SessionId, SessionView};
use uuid::Uuid;

use super::{AppState, ErrorResponse, service_error_response};
use crate::{logging, metrics};

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub host: String,
    pub guest: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub player: String,
    pub cell: u8,
}

#[derive(Debug, Deserialize)]
pub struct ForfeitRequest {
    pub player: String,
}

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: String,
    pub host: String,
    pub guest: String,
    pub turn_holder: String,
    pub status: String,
    pub open_cells: Vec<u8>,
    pub host_cells: Vec<u8>,
    pub guest_cells: Vec<u8>,
    pub started_at: String,
    pub message: String,
}

impl GameResponse {
    fn from_view(view: &SessionView, message: impl Into<String>) -> Self {
        Self {
            id: view.id.to_string(),
            host: view.host.to_string(),
            guest: view.guest.to_string(),
            turn_holder: view.turn_holder.to_string(),
            status: view.status.to_string(),
            open_cells: view.open_cells.iter().map(|c| c.label()).collect(),
            host_cells: view.host_cells.iter().map(|c| c.label()).collect(),
            guest_cells: view.guest_cells.iter().map(|c| c.label()).collect(),
            started_at: view.started_at.to_rfc3339(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MoveHistoryEntry {
    pub player: String,
    pub cell: u8,
}

impl From<&MoveRecord> for MoveHistoryEntry {
    fn from(record: &MoveRecord) -> Self {
        Self {
            player: record.player.to_string(),
            cell: record.cell.label(),
        }
    }
}

fn completion_label(completion: &Completion) -> &'static str {
    match completion {
        Completion::Won { .. } => "won",
        Completion::Tied => "tied",
        Completion::Forfeited { .. } => "forfeited",
    }
}

/// Start a game between two registered players.
///
/// The guest takes the first turn and is notified that the game is
/// waiting on them.
///
/// # Request Body
///
/// ```json
/// {
///   "host": "alice",
///   "guest": "bob"
/// }
/// ```
///
/// # Response
///
/// Returns `201 Created` with the fresh game. `turn_holder` is the guest
/// and all nine cells are open.
///
/// # Errors
///
/// - `404 Not Found`: Either participant is not registered, or host and
///   guest are the same player
/// - `409 Conflict`: The pair already has a game in progress
pub async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameResponse>), (StatusCode, Json<ErrorResponse>)> {
    let host = PlayerName::new(&request.host);
    let guest = PlayerName::new(&request.guest);
    match state.manager.start_session(&host, &guest).await {
        Ok(view) => {
            metrics::games_started_total();
            logging::log_game_event(
                "game_started",
                &view.id.to_string(),
                Some(host.as_str()),
                &format!("{host} hosts {guest}"),
            );
            Ok((
                StatusCode::CREATED,
                Json(GameResponse::from_view(&view, "Good luck!")),
            ))
        }
        Err(e) => Err(service_error_response(&e)),
    }
}

/// List every game still in progress.
pub async fn list_active_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.active_sessions().await {
        Ok(views) => {
            let games = views
                .iter()
                .map(|view| GameResponse::from_view(view, "Ready to make a move?"))
                .collect();
            Ok(Json(games))
        }
        Err(e) => Err(service_error_response(&e)),
    }
}

/// Current snapshot of a game, in progress or completed.
///
/// # Errors
///
/// - `404 Not Found`: No game under that id
pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.snapshot(SessionId::from(game_id)).await {
        Ok(view) => Ok(Json(GameResponse::from_view(&view, "Ready to make a move?"))),
        Err(e) => Err(service_error_response(&e)),
    }
}

/// Claim a cell.
///
/// The response snapshot reflects the accepted move, and `message` says
/// what happened ("Your move. Cell 5 claimed.", "You win!", "Tie game.").
///
/// # Request Body
///
/// ```json
/// {
///   "player": "bob",
///   "cell": 5
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Cell out of range or already claimed
/// - `403 Forbidden`: Player is not in this game
/// - `404 Not Found`: No game under that id
/// - `409 Conflict`: Not the player's turn, or the game is over
pub async fn make_move(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<GameResponse>, (StatusCode, Json<ErrorResponse>)> {
    let player = PlayerName::new(&request.player);
    let id = SessionId::from(game_id);
    match state.manager.apply_move(id, &player, request.cell).await {
        Ok(reply) => {
            metrics::moves_played_total();
            logging::log_game_event(
                "move_played",
                &id.to_string(),
                Some(player.as_str()),
                &reply.message,
            );
            if let Some(completion) = &reply.completion {
                metrics::games_completed_total(completion_label(completion));
            }
            Ok(Json(GameResponse::from_view(&reply.view, reply.message)))
        }
        Err(e) => Err(service_error_response(&e)),
    }
}

/// Surrender a game.
///
/// The forfeiting player takes a Forfeited outcome and their opponent
/// wins.
///
/// # Errors
///
/// - `403 Forbidden`: Player is not in this game
/// - `404 Not Found`: No game under that id
/// - `409 Conflict`: The game is already over
pub async fn forfeit_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    Json(request): Json<ForfeitRequest>,
) -> Result<Json<GameResponse>, (StatusCode, Json<ErrorResponse>)> {
    let player = PlayerName::new(&request.player);
    let id = SessionId::from(game_id);
    match state.manager.forfeit(id, &player).await {
        Ok(reply) => {
            logging::log_game_event(
                "game_forfeited",
                &id.to_string(),
                Some(player.as_str()),
                &reply.message,
            );
            if let Some(completion) = &reply.completion {
                metrics::games_completed_total(completion_label(completion));
            }
            Ok(Json(GameResponse::from_view(&reply.view, reply.message)))
        }
        Err(e) => Err(service_error_response(&e)),
    }
}

/// Ordered move log of a game.
///
/// # Errors
///
/// - `404 Not Found`: No game under that id
pub async fn get_game_history(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<Vec<MoveHistoryEntry>>, (StatusCode, Json<ErrorResponse>)> {
    match state.manager.history(SessionId::from(game_id)).await {
        Ok(moves) => Ok(Json(moves.iter().map(MoveHistoryEntry::from).collect())),
        Err(e) => Err(service_error_response(&e)),
    }
}
