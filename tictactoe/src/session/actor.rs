//! The per-session actor.
//!
//! Each live game session runs inside its own task, consuming requests
//! from a bounded inbox one at a time. That single consumer is what
//! serializes concurrent moves on the same game: there are no locks
//! around session state, just message order.
//!
//! The actor answers the caller first and only then talks to the store,
//! the registry, and the dispatcher. A failed save or notification is
//! logged and never rolls back a move that already happened in memory.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::SendError};

use super::messages::SessionMessage;
use crate::{
    db::{PlayerRegistry, ScoreHistory, SessionStore},
    game::{Completion, GameSession, GameStatus, MoveReply, ScoreRecord, SessionId},
    notify::{NotificationDispatcher, NotificationKind},
};

/// Cloneable handle for sending requests to a running session actor.
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionMessage>,
    session_id: SessionId,
}

impl SessionHandle {
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// True once the actor has stopped and will accept nothing further.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queues a message for the actor.
    ///
    /// # Errors
    ///
    /// Returns the message back if the actor has already stopped.
    pub async fn send(&self, message: SessionMessage) -> Result<(), SendError<SessionMessage>> {
        self.sender.send(message).await
    }
}

/// Owns one [`GameSession`] and processes its requests sequentially.
pub struct SessionActor {
    session: GameSession,
    inbox: mpsc::Receiver<SessionMessage>,
    registry: Arc<dyn PlayerRegistry>,
    store: Arc<dyn SessionStore>,
    scores: Arc<dyn ScoreHistory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl SessionActor {
    /// Creates the actor and the handle used to reach it.
    pub fn new(
        session: GameSession,
        registry: Arc<dyn PlayerRegistry>,
        store: Arc<dyn SessionStore>,
        scores: Arc<dyn ScoreHistory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> (Self, SessionHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let handle = SessionHandle {
            sender,
            session_id: session.id(),
        };
        let actor = Self {
            session,
            inbox,
            registry,
            store,
            scores,
            dispatcher,
        };
        (actor, handle)
    }

    /// Runs until the session completes or every handle is dropped.
    pub async fn run(mut self) {
        log::info!(
            "session {} started: {} vs {}",
            self.session.id(),
            self.session.host(),
            self.session.guest()
        );

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message).await;
            if self.session.status() == GameStatus::Completed {
                break;
            }
        }

        log::info!("session {} actor stopped", self.session.id());
    }

    async fn handle_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::ApplyMove {
                player,
                cell,
                response,
            } => match self.session.apply_move(&player, cell) {
                Ok(reply) => {
                    let completion = reply.completion.clone();
                    let next = reply.view.turn_holder.clone();
                    let _ = response.send(Ok(reply));

                    self.persist_state().await;
                    match completion {
                        Some(completion) => self.finish(&completion).await,
                        None => {
                            self.dispatcher
                                .notify(&next, self.session.id(), NotificationKind::YourTurn)
                                .await;
                        }
                    }
                }
                Err(e) => {
                    let _ = response.send(Err(e));
                }
            },

            SessionMessage::Forfeit { player, response } => {
                match self.session.forfeit(&player) {
                    Ok(completion) => {
                        let reply = MoveReply {
                            view: self.session.view(),
                            message: format!(
                                "You have forfeited the game {}.",
                                self.session.id()
                            ),
                            completion: Some(completion.clone()),
                        };
                        let _ = response.send(Ok(reply));

                        self.persist_state().await;
                        self.finish(&completion).await;
                    }
                    Err(e) => {
                        let _ = response.send(Err(e));
                    }
                }
            }

            SessionMessage::Snapshot { response } => {
                let _ = response.send(self.session.view());
            }

            SessionMessage::History { response } => {
                let _ = response.send(self.session.history().to_vec());
            }
        }
    }

    async fn persist_state(&self) {
        if let Err(e) = self.store.save(&self.session).await {
            log::error!(
                "session {}: failed to persist state: {e}",
                self.session.id()
            );
        }
    }

    /// Completion bookkeeping: score record, counters, notifications.
    ///
    /// Notifications go out last so that anyone reacting to one observes
    /// the score and counters already in place.
    async fn finish(&self, completion: &Completion) {
        let id = self.session.id();
        let score = ScoreRecord::from_completion(&self.session, completion);

        if let Err(e) = self.scores.record(&score).await {
            log::error!("session {id}: failed to record score: {e}");
        }
        for (player, outcome) in [
            (&score.host, score.host_outcome),
            (&score.guest, score.guest_outcome),
        ] {
            if let Err(e) = self.registry.record_outcome(player, outcome).await {
                log::error!("session {id}: failed to update counters for {player}: {e}");
            }
        }

        match completion {
            Completion::Won { winner, .. } => {
                self.dispatcher
                    .notify(winner, id, NotificationKind::YouWon)
                    .await;
            }
            Completion::Tied => {
                self.dispatcher
                    .notify(&score.host, id, NotificationKind::GameTied)
                    .await;
                self.dispatcher
                    .notify(&score.guest, id, NotificationKind::GameTied)
                    .await;
            }
            Completion::Forfeited { winner, .. } => {
                self.dispatcher
                    .notify(winner, id, NotificationKind::OpponentForfeited)
                    .await;
                self.dispatcher
                    .notify(winner, id, NotificationKind::YouWon)
                    .await;
            }
        }
        log::info!("session {id} completed");
    }
}
