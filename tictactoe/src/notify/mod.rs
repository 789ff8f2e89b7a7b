//! Notification dispatch.
//!
//! Game progress produces [`Notification`]s describing who should hear
//! about what. Delivery is somebody else's job: the library hands
//! notifications to a [`NotificationDispatcher`] and moves on. The
//! bundled [`ChannelDispatcher`] pushes them onto a bounded channel
//! without ever blocking game progress.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::game::{PlayerName, SessionId};

/// What happened, from the recipient's point of view.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum NotificationKind {
    /// The opponent moved; the recipient is up.
    YourTurn,
    /// The recipient won their game.
    YouWon,
    /// The opponent surrendered.
    OpponentForfeited,
    /// The game ended with no winner.
    GameTied,
    /// A game is still waiting on the recipient.
    Reminder,
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            NotificationKind::YourTurn => "your-turn",
            NotificationKind::YouWon => "you-won",
            NotificationKind::OpponentForfeited => "opponent-forfeited",
            NotificationKind::GameTied => "game-tied",
            NotificationKind::Reminder => "reminder",
        };
        write!(f, "{repr}")
    }
}

/// A single dispatch request.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Notification {
    pub recipient: PlayerName,
    pub session_id: SessionId,
    pub kind: NotificationKind,
}

/// Accepts dispatch requests from game progress.
///
/// Implementations must never block or fail game flow: delivery problems
/// are logged and swallowed.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, recipient: &PlayerName, session_id: SessionId, kind: NotificationKind);
}

/// Dispatcher backed by a bounded in-process channel.
///
/// A full channel drops the notification rather than stalling the game
/// that produced it.
pub struct ChannelDispatcher {
    sender: mpsc::Sender<Notification>,
}

impl ChannelDispatcher {
    /// Creates the dispatcher and the receiving end a delivery task
    /// should drain.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationDispatcher for ChannelDispatcher {
    async fn notify(&self, recipient: &PlayerName, session_id: SessionId, kind: NotificationKind) {
        let notification = Notification {
            recipient: recipient.clone(),
            session_id,
            kind,
        };
        match self.sender.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(n)) => {
                log::warn!(
                    "notification channel full, dropping {} for {}",
                    n.kind,
                    n.recipient
                );
            }
            Err(TrySendError::Closed(n)) => {
                log::debug!(
                    "notification channel closed, dropping {} for {}",
                    n.kind,
                    n.recipient
                );
            }
        }
    }
}
