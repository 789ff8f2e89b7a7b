//! Score records derived from completed sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use super::{
    entities::{PlayerName, SessionId},
    state_machine::{Completion, GameSession},
};

/// One participant's result in a finished game.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Outcome {
    Won,
    Lost,
    Tied,
    Forfeited,
}

impl Outcome {
    /// Whether this outcome counts toward the player's win total.
    #[must_use]
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Won)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            Outcome::Won => "Won",
            Outcome::Lost => "Lost",
            Outcome::Tied => "Tied",
            Outcome::Forfeited => "Forfeited",
        };
        write!(f, "{repr}")
    }
}

/// Immutable record of how a session ended, created exactly once per game.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScoreRecord {
    pub session_id: SessionId,
    pub host: PlayerName,
    pub guest: PlayerName,
    pub host_outcome: Outcome,
    pub guest_outcome: Outcome,
    pub ended_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Derives the record for a session that just completed.
    #[must_use]
    pub fn from_completion(session: &GameSession, completion: &Completion) -> Self {
        let (host_outcome, guest_outcome) = match completion {
            Completion::Won { winner, .. } => {
                if winner == session.host() {
                    (Outcome::Won, Outcome::Lost)
                } else {
                    (Outcome::Lost, Outcome::Won)
                }
            }
            Completion::Tied => (Outcome::Tied, Outcome::Tied),
            Completion::Forfeited { forfeiter, .. } => {
                if forfeiter == session.host() {
                    (Outcome::Forfeited, Outcome::Won)
                } else {
                    (Outcome::Won, Outcome::Forfeited)
                }
            }
        };
        Self {
            session_id: session.id(),
            host: session.host().clone(),
            guest: session.guest().clone(),
            host_outcome,
            guest_outcome,
            ended_at: Utc::now(),
        }
    }

    /// The outcome for one of the two participants, `None` for outsiders.
    #[must_use]
    pub fn outcome_for(&self, player: &PlayerName) -> Option<Outcome> {
        if *player == self.host {
            Some(self.host_outcome)
        } else if *player == self.guest {
            Some(self.guest_outcome)
        } else {
            None
        }
    }
}
