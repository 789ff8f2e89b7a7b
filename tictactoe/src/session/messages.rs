//! Messages understood by a session actor.

use tokio::sync::oneshot;

use crate::game::{GameError, MoveRecord, MoveReply, PlayerName, SessionView};

/// Requests routed to a running session.
///
/// Every variant carries a oneshot sender the actor answers on. The
/// actor replies before starting any persistence or notification work,
/// so callers never wait on collaborators.
#[derive(Debug)]
pub enum SessionMessage {
    /// Claim a cell for a player.
    ApplyMove {
        player: PlayerName,
        cell: u8,
        response: oneshot::Sender<Result<MoveReply, GameError>>,
    },

    /// Surrender the game to the other participant.
    Forfeit {
        player: PlayerName,
        response: oneshot::Sender<Result<MoveReply, GameError>>,
    },

    /// Fetch a read-only snapshot of the session.
    Snapshot {
        response: oneshot::Sender<SessionView>,
    },

    /// Fetch the ordered move log.
    History {
        response: oneshot::Sender<Vec<MoveRecord>>,
    },
}
