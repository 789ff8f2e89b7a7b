//! A library for turn-based tic-tac-toe game sessions.
//!
//! The heart of the crate is the [`game`] module: a two-state session
//! machine (`Active` -> `Completed`) that validates turns, tracks each
//! player's claimed cells, detects wins and ties, and derives a score
//! record when the game ends. Around it:
//!
//! - [`session`] runs one actor per live game and routes requests to it,
//!   which is what serializes concurrent moves on the same session.
//! - [`db`] defines the player registry, session store, and score
//!   history as traits, with PostgreSQL and in-memory implementations.
//! - [`notify`] carries "your turn" / "you won" style notifications out
//!   of the game flow without blocking it.
//!
//! # Example
//!
//! ```
//! use tictactoe::game::{GameSession, GameStatus, PlayerName};
//!
//! let host = PlayerName::new("alice");
//! let guest = PlayerName::new("bob");
//! let mut session = GameSession::new(host.clone(), guest.clone());
//!
//! // the guest moves first
//! assert_eq!(session.turn_holder(), &guest);
//! let reply = session.apply_move(&guest, 5).unwrap();
//! assert_eq!(reply.message, "Your move. Cell 5 claimed.");
//! assert_eq!(session.status(), GameStatus::Active);
//! ```

pub mod db;
pub mod game;
pub mod notify;
pub mod session;

pub use db::{
    Database, DatabaseConfig, MemoryPlayerRegistry, MemoryScoreHistory, MemorySessionStore,
};
pub use game::{
    Board, Cell, Completion, GameError, GameSession, GameStatus, MoveRecord, MoveReply, Outcome,
    PlayerName, PlayerRecord, ScoreRecord, SessionId, SessionView,
};
pub use notify::{ChannelDispatcher, Notification, NotificationDispatcher, NotificationKind};
pub use session::{ServiceError, ServiceResult, SessionManager};
