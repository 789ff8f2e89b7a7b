//! The tic-tac-toe game engine.
//!
//! [`GameSession`] is the state machine; [`Board`] and the win rules in
//! [`rules`] are its pure building blocks. [`ScoreRecord`] captures how a
//! finished session ended.

pub mod board;
pub mod constants;
pub mod entities;
pub mod rules;
pub mod score;
pub mod state_machine;

pub use board::Board;
pub use entities::{Cell, GameStatus, MoveRecord, PlayerName, PlayerRecord, SessionId};
pub use score::{Outcome, ScoreRecord};
pub use state_machine::{Completion, GameError, GameSession, MoveReply, SessionView};
