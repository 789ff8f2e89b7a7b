//! The game session state machine.
//!
//! A [`GameSession`] moves through two states:
//!
//! ```text
//! Active ──win / tie / forfeit──> Completed
//! ```
//!
//! Every mutation goes through [`GameSession::apply_move`] or
//! [`GameSession::forfeit`]; there is no other way to change a session.
//! The session transitions to `Completed` exactly once and never leaves it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use super::{
    board::Board,
    entities::{Cell, GameStatus, MoveRecord, PlayerName, SessionId},
    rules,
};

/// Ways a move or forfeit request can be rejected.
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("not a participant in this game")]
    NotParticipant,
    #[error("game is already over")]
    SessionCompleted,
    #[error("not your turn")]
    OutOfTurn,
    #[error("invalid move at cell {cell}")]
    InvalidMove { cell: u8 },
    #[error("game is not active")]
    InvalidState,
    #[error("game already in progress")]
    DuplicateSession,
    #[error("need 2 registered players")]
    InsufficientParticipants,
}

/// How a session reached `Completed`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Completion {
    Won { winner: PlayerName, loser: PlayerName },
    Tied,
    Forfeited { forfeiter: PlayerName, winner: PlayerName },
}

/// Successful result of a move or forfeit.
#[derive(Clone, Debug)]
pub struct MoveReply {
    pub view: SessionView,
    pub message: String,
    /// Populated when this action ended the game.
    pub completion: Option<Completion>,
}

/// Read-only snapshot of a session, safe to hand to callers.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub host: PlayerName,
    pub guest: PlayerName,
    pub host_cells: Vec<Cell>,
    pub guest_cells: Vec<Cell>,
    pub open_cells: Vec<Cell>,
    pub turn_holder: PlayerName,
    pub status: GameStatus,
    pub started_at: DateTime<Utc>,
}

/// A two-player tic-tac-toe session.
///
/// The guest takes the first turn. The host created the session and moves
/// second. Claimed cells are tracked per player; the board holds whatever
/// is still open.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GameSession {
    id: SessionId,
    host: PlayerName,
    guest: PlayerName,
    host_cells: BTreeSet<Cell>,
    guest_cells: BTreeSet<Cell>,
    board: Board,
    turn_holder: PlayerName,
    status: GameStatus,
    moves: Vec<MoveRecord>,
    started_at: DateTime<Utc>,
}

impl GameSession {
    #[must_use]
    pub fn new(host: PlayerName, guest: PlayerName) -> Self {
        let turn_holder = guest.clone();
        Self {
            id: SessionId::new(),
            host,
            guest,
            host_cells: BTreeSet::new(),
            guest_cells: BTreeSet::new(),
            board: Board::new(),
            turn_holder,
            status: GameStatus::Active,
            moves: Vec::new(),
            started_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn host(&self) -> &PlayerName {
        &self.host
    }

    #[must_use]
    pub fn guest(&self) -> &PlayerName {
        &self.guest
    }

    #[must_use]
    pub fn turn_holder(&self) -> &PlayerName {
        &self.turn_holder
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn is_participant(&self, player: &PlayerName) -> bool {
        *player == self.host || *player == self.guest
    }

    /// Cells claimed by the given participant, or `None` for outsiders.
    #[must_use]
    pub fn cells_of(&self, player: &PlayerName) -> Option<&BTreeSet<Cell>> {
        if *player == self.host {
            Some(&self.host_cells)
        } else if *player == self.guest {
            Some(&self.guest_cells)
        } else {
            None
        }
    }

    #[must_use]
    pub fn open_cells(&self) -> &BTreeSet<Cell> {
        self.board.open_cells()
    }

    /// The ordered move log.
    #[must_use]
    pub fn history(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Applies a move for `actor` at the cell with the given label.
    ///
    /// Rejections are checked in a fixed order: participation, session
    /// status, turn ownership, then move validity. A rejected move leaves
    /// the session untouched.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotParticipant`] if `actor` is not in this session.
    /// - [`GameError::SessionCompleted`] if the game is already over.
    /// - [`GameError::OutOfTurn`] if it is not `actor`'s turn.
    /// - [`GameError::InvalidMove`] if the label is outside 1..=9 or the
    ///   cell is already claimed.
    pub fn apply_move(&mut self, actor: &PlayerName, cell: u8) -> Result<MoveReply, GameError> {
        if !self.is_participant(actor) {
            return Err(GameError::NotParticipant);
        }
        if self.status == GameStatus::Completed {
            return Err(GameError::SessionCompleted);
        }
        if *actor != self.turn_holder {
            return Err(GameError::OutOfTurn);
        }
        let cell = Cell::new(cell).ok_or(GameError::InvalidMove { cell })?;
        self.board.claim(cell)?;

        let won = {
            let claimed = if *actor == self.host {
                &mut self.host_cells
            } else {
                &mut self.guest_cells
            };
            claimed.insert(cell);
            rules::has_won(claimed)
        };
        self.moves.push(MoveRecord {
            player: actor.clone(),
            cell,
        });

        let other = self.other(actor).clone();
        let (completion, message) = if won {
            self.status = GameStatus::Completed;
            let completion = Completion::Won {
                winner: actor.clone(),
                loser: other,
            };
            (Some(completion), "You win!".to_string())
        } else if self.board.is_full() {
            self.status = GameStatus::Completed;
            (Some(Completion::Tied), "Tie game.".to_string())
        } else {
            self.turn_holder = other;
            (None, format!("Your move. Cell {cell} claimed."))
        };

        Ok(MoveReply {
            view: self.view(),
            message,
            completion,
        })
    }

    /// Ends the session in favor of the other participant.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotParticipant`] if `actor` is not in this session.
    /// - [`GameError::InvalidState`] if the game is already over.
    pub fn forfeit(&mut self, actor: &PlayerName) -> Result<Completion, GameError> {
        if !self.is_participant(actor) {
            return Err(GameError::NotParticipant);
        }
        if self.status == GameStatus::Completed {
            return Err(GameError::InvalidState);
        }
        self.status = GameStatus::Completed;
        Ok(Completion::Forfeited {
            forfeiter: actor.clone(),
            winner: self.other(actor).clone(),
        })
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            host: self.host.clone(),
            guest: self.guest.clone(),
            host_cells: self.host_cells.iter().copied().collect(),
            guest_cells: self.guest_cells.iter().copied().collect(),
            open_cells: self.board.open_cells().iter().copied().collect(),
            turn_holder: self.turn_holder.clone(),
            status: self.status,
            started_at: self.started_at,
        }
    }

    fn other(&self, player: &PlayerName) -> &PlayerName {
        if *player == self.host {
            &self.guest
        } else {
            &self.host
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(PlayerName::new("alice"), PlayerName::new("bob"))
    }

    fn alice() -> PlayerName {
        PlayerName::new("alice")
    }

    fn bob() -> PlayerName {
        PlayerName::new("bob")
    }

    fn cell_count(session: &GameSession) -> usize {
        session.cells_of(session.host()).unwrap().len()
            + session.cells_of(session.guest()).unwrap().len()
            + session.open_cells().len()
    }

    #[test]
    fn test_guest_takes_the_first_turn() {
        let session = session();
        assert_eq!(session.turn_holder(), session.guest());
        assert_eq!(session.status(), GameStatus::Active);
    }

    #[test]
    fn test_host_moving_first_is_rejected() {
        let mut session = session();
        let result = session.apply_move(&alice(), 5);
        assert_eq!(result.unwrap_err(), GameError::OutOfTurn);
    }

    #[test]
    fn test_move_by_outsider_fails() {
        let mut session = session();
        let result = session.apply_move(&PlayerName::new("mallory"), 5);
        assert_eq!(result.unwrap_err(), GameError::NotParticipant);
    }

    #[test]
    fn test_turn_switches_after_each_move() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        assert_eq!(session.turn_holder(), &alice());
        session.apply_move(&alice(), 1).unwrap();
        assert_eq!(session.turn_holder(), &bob());
    }

    #[test]
    fn test_out_of_range_cell_is_rejected() {
        let mut session = session();
        assert_eq!(
            session.apply_move(&bob(), 0).unwrap_err(),
            GameError::InvalidMove { cell: 0 }
        );
        assert_eq!(
            session.apply_move(&bob(), 10).unwrap_err(),
            GameError::InvalidMove { cell: 10 }
        );
    }

    #[test]
    fn test_taken_cell_is_rejected() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        let result = session.apply_move(&alice(), 5);
        assert_eq!(result.unwrap_err(), GameError::InvalidMove { cell: 5 });
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        let moves_before = session.history().len();
        let open_before = session.open_cells().len();

        // bob tries to move twice in a row
        let result = session.apply_move(&bob(), 1);
        assert_eq!(result.unwrap_err(), GameError::OutOfTurn);
        assert_eq!(session.history().len(), moves_before);
        assert_eq!(session.open_cells().len(), open_before);
        assert_eq!(session.turn_holder(), &alice());
    }

    #[test]
    fn test_guest_wins_with_a_completed_row() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        session.apply_move(&alice(), 1).unwrap();
        session.apply_move(&bob(), 6).unwrap();
        session.apply_move(&alice(), 7).unwrap();
        let reply = session.apply_move(&bob(), 4).unwrap();

        assert_eq!(session.status(), GameStatus::Completed);
        assert_eq!(reply.message, "You win!");
        assert_eq!(
            reply.completion,
            Some(Completion::Won {
                winner: bob(),
                loser: alice(),
            })
        );
        // no turn switch after the winning move
        assert_eq!(session.turn_holder(), &bob());
    }

    #[test]
    fn test_no_moves_accepted_after_completion() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        session.apply_move(&alice(), 1).unwrap();
        session.apply_move(&bob(), 6).unwrap();
        session.apply_move(&alice(), 7).unwrap();
        session.apply_move(&bob(), 4).unwrap();

        let result = session.apply_move(&alice(), 9);
        assert_eq!(result.unwrap_err(), GameError::SessionCompleted);
    }

    #[test]
    fn test_outsider_rejection_wins_over_completion() {
        let mut session = session();
        session.forfeit(&alice()).unwrap();
        let result = session.apply_move(&PlayerName::new("mallory"), 3);
        assert_eq!(result.unwrap_err(), GameError::NotParticipant);
    }

    #[test]
    fn test_full_board_without_a_line_is_a_tie() {
        let mut session = session();
        // bob: 1 2 6 7 9, alice: 3 4 5 8; no line for either
        let script = [
            (bob(), 1),
            (alice(), 3),
            (bob(), 2),
            (alice(), 4),
            (bob(), 6),
            (alice(), 5),
            (bob(), 7),
            (alice(), 8),
        ];
        for (player, cell) in script {
            session.apply_move(&player, cell).unwrap();
        }
        let reply = session.apply_move(&bob(), 9).unwrap();

        assert_eq!(session.status(), GameStatus::Completed);
        assert_eq!(reply.message, "Tie game.");
        assert_eq!(reply.completion, Some(Completion::Tied));
        assert!(session.open_cells().is_empty());
    }

    #[test]
    fn test_cell_conservation_across_a_full_game() {
        let mut session = session();
        let script = [
            (bob(), 5),
            (alice(), 1),
            (bob(), 6),
            (alice(), 7),
            (bob(), 4),
        ];
        for (player, cell) in script {
            assert_eq!(cell_count(&session), 9);
            session.apply_move(&player, cell).unwrap();
        }
        assert_eq!(cell_count(&session), 9);
    }

    #[test]
    fn test_claimed_sets_stay_disjoint() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        session.apply_move(&alice(), 1).unwrap();
        session.apply_move(&bob(), 9).unwrap();

        let host_cells = session.cells_of(&alice()).unwrap();
        let guest_cells = session.cells_of(&bob()).unwrap();
        assert!(host_cells.is_disjoint(guest_cells));
    }

    #[test]
    fn test_moves_are_logged_in_order() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        session.apply_move(&alice(), 1).unwrap();

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].player, bob());
        assert_eq!(history[0].cell, Cell::new(5).unwrap());
        assert_eq!(history[1].player, alice());
        assert_eq!(history[1].cell, Cell::new(1).unwrap());
    }

    #[test]
    fn test_forfeit_hands_the_win_to_the_other_player() {
        let mut session = session();
        let completion = session.forfeit(&alice()).unwrap();

        assert_eq!(session.status(), GameStatus::Completed);
        assert_eq!(
            completion,
            Completion::Forfeited {
                forfeiter: alice(),
                winner: bob(),
            }
        );
    }

    #[test]
    fn test_forfeiting_twice_fails() {
        let mut session = session();
        session.forfeit(&alice()).unwrap();
        let result = session.forfeit(&bob());
        assert_eq!(result.unwrap_err(), GameError::InvalidState);
    }

    #[test]
    fn test_forfeit_by_outsider_fails() {
        let mut session = session();
        let result = session.forfeit(&PlayerName::new("mallory"));
        assert_eq!(result.unwrap_err(), GameError::NotParticipant);
    }

    #[test]
    fn test_view_reflects_session_state() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();

        let view = session.view();
        assert_eq!(view.id, session.id());
        assert_eq!(view.guest_cells, vec![Cell::new(5).unwrap()]);
        assert!(view.host_cells.is_empty());
        assert_eq!(view.open_cells.len(), 8);
        assert_eq!(view.turn_holder, alice());
        assert_eq!(view.status, GameStatus::Active);
    }

    #[test]
    fn test_mid_game_move_message_names_the_cell() {
        let mut session = session();
        let reply = session.apply_move(&bob(), 5).unwrap();
        assert_eq!(reply.message, "Your move. Cell 5 claimed.");
    }

    #[test]
    fn test_session_survives_serde_round_trip() {
        let mut session = session();
        session.apply_move(&bob(), 5).unwrap();
        session.apply_move(&alice(), 1).unwrap();

        let encoded = serde_json::to_string(&session).unwrap();
        let mut restored: GameSession = serde_json::from_str(&encoded).unwrap();

        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.turn_holder(), &bob());
        assert_eq!(restored.history(), session.history());
        // play continues from the restored state
        restored.apply_move(&bob(), 6).unwrap();
    }
}
