//! Session lifecycle and request routing.
//!
//! The [`SessionManager`] starts sessions, keeps handles to their actors,
//! and routes requests by session id. A session whose actor has stopped
//! (completed games, restarts) is served from the store instead; active
//! sessions found there are revived into fresh actors on demand.

use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::{RwLock, oneshot};

use super::{
    actor::{SessionActor, SessionHandle},
    messages::SessionMessage,
};
use crate::{
    db::{PlayerRegistry, RegistryError, ScoreHistory, SessionStore, StoreError},
    game::{
        GameError, GameSession, GameStatus, MoveRecord, MoveReply, PlayerName, SessionId,
        SessionView,
    },
    notify::{NotificationDispatcher, NotificationKind},
};

/// Errors surfaced by session orchestration
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No session exists under the requested id
    #[error("Game not found")]
    SessionNotFound,

    /// The game rules rejected the request
    #[error("{0}")]
    Game(#[from] GameError),

    /// The player registry rejected the request
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// The session store failed
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The session actor went away mid-request
    #[error("Game is no longer accepting requests")]
    ChannelClosed,
}

/// Result type for session orchestration
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Starts, tracks, and routes requests to game sessions.
#[derive(Clone)]
pub struct SessionManager {
    registry: Arc<dyn PlayerRegistry>,
    store: Arc<dyn SessionStore>,
    scores: Arc<dyn ScoreHistory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl SessionManager {
    pub fn new(
        registry: Arc<dyn PlayerRegistry>,
        store: Arc<dyn SessionStore>,
        scores: Arc<dyn ScoreHistory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            registry,
            store,
            scores,
            dispatcher,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Spawns actors for every session the store still considers active.
    ///
    /// Called once at startup so games survive a server restart.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store cannot be read.
    pub async fn load_existing_sessions(&self) -> ServiceResult<usize> {
        let active = self.store.active_sessions().await?;
        let count = active.len();
        for session in active {
            self.spawn_or_get(session).await;
        }
        if count > 0 {
            log::info!("restored {count} active session(s) from storage");
        }
        Ok(count)
    }

    /// Starts a new session between two registered players.
    ///
    /// The guest moves first and is notified that it is their turn.
    ///
    /// # Errors
    ///
    /// - [`GameError::InsufficientParticipants`] if either name is not
    ///   registered, or host and guest are the same player.
    /// - [`GameError::DuplicateSession`] if the pair already has an
    ///   active session, in either host/guest order.
    pub async fn start_session(
        &self,
        host: &PlayerName,
        guest: &PlayerName,
    ) -> ServiceResult<SessionView> {
        if host == guest {
            return Err(GameError::InsufficientParticipants.into());
        }
        if self.registry.resolve(host).await?.is_none() {
            return Err(GameError::InsufficientParticipants.into());
        }
        if self.registry.resolve(guest).await?.is_none() {
            return Err(GameError::InsufficientParticipants.into());
        }
        if self.store.find_active_by_pair(host, guest).await?.is_some() {
            return Err(GameError::DuplicateSession.into());
        }

        let session = GameSession::new(host.clone(), guest.clone());
        self.store.save(&session).await?;

        let view = session.view();
        let id = session.id();
        let first = session.turn_holder().clone();
        self.spawn_or_get(session).await;
        self.dispatcher
            .notify(&first, id, NotificationKind::YourTurn)
            .await;
        log::info!("started session {id}: {host} hosts {guest}");
        Ok(view)
    }

    /// Routes a move to the session's actor.
    ///
    /// # Errors
    ///
    /// [`ServiceError::SessionNotFound`] for unknown ids, otherwise
    /// whatever the game rules return.
    pub async fn apply_move(
        &self,
        id: SessionId,
        player: &PlayerName,
        cell: u8,
    ) -> ServiceResult<MoveReply> {
        if let Some(handle) = self.live_handle(id).await {
            let (tx, rx) = oneshot::channel();
            let message = SessionMessage::ApplyMove {
                player: player.clone(),
                cell,
                response: tx,
            };
            if handle.send(message).await.is_ok() {
                if let Ok(result) = rx.await {
                    return result.map_err(ServiceError::from);
                }
            }
            self.prune_closed(id).await;
        }

        let session = self
            .store
            .load(id)
            .await?
            .ok_or(ServiceError::SessionNotFound)?;
        if session.status() == GameStatus::Completed {
            return Err(GameError::SessionCompleted.into());
        }

        log::info!("reviving session {id} from storage");
        let handle = self.spawn_or_get(session).await;
        let (tx, rx) = oneshot::channel();
        let message = SessionMessage::ApplyMove {
            player: player.clone(),
            cell,
            response: tx,
        };
        handle
            .send(message)
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;
        rx.await
            .map_err(|_| ServiceError::ChannelClosed)?
            .map_err(ServiceError::from)
    }

    /// Routes a forfeit to the session's actor.
    ///
    /// # Errors
    ///
    /// [`ServiceError::SessionNotFound`] for unknown ids;
    /// [`GameError::InvalidState`] if the game is already over.
    pub async fn forfeit(&self, id: SessionId, player: &PlayerName) -> ServiceResult<MoveReply> {
        if let Some(handle) = self.live_handle(id).await {
            let (tx, rx) = oneshot::channel();
            let message = SessionMessage::Forfeit {
                player: player.clone(),
                response: tx,
            };
            if handle.send(message).await.is_ok() {
                if let Ok(result) = rx.await {
                    return result.map_err(ServiceError::from);
                }
            }
            self.prune_closed(id).await;
        }

        let session = self
            .store
            .load(id)
            .await?
            .ok_or(ServiceError::SessionNotFound)?;
        if session.status() == GameStatus::Completed {
            return Err(GameError::InvalidState.into());
        }

        log::info!("reviving session {id} from storage");
        let handle = self.spawn_or_get(session).await;
        let (tx, rx) = oneshot::channel();
        let message = SessionMessage::Forfeit {
            player: player.clone(),
            response: tx,
        };
        handle
            .send(message)
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;
        rx.await
            .map_err(|_| ServiceError::ChannelClosed)?
            .map_err(ServiceError::from)
    }

    /// Snapshot of a session, live or archived.
    ///
    /// # Errors
    ///
    /// [`ServiceError::SessionNotFound`] for unknown ids.
    pub async fn snapshot(&self, id: SessionId) -> ServiceResult<SessionView> {
        if let Some(handle) = self.live_handle(id).await {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(SessionMessage::Snapshot { response: tx })
                .await
                .is_ok()
            {
                if let Ok(view) = rx.await {
                    return Ok(view);
                }
            }
        }
        let session = self
            .store
            .load(id)
            .await?
            .ok_or(ServiceError::SessionNotFound)?;
        Ok(session.view())
    }

    /// Ordered move log of a session, live or archived.
    ///
    /// # Errors
    ///
    /// [`ServiceError::SessionNotFound`] for unknown ids.
    pub async fn history(&self, id: SessionId) -> ServiceResult<Vec<MoveRecord>> {
        if let Some(handle) = self.live_handle(id).await {
            let (tx, rx) = oneshot::channel();
            if handle
                .send(SessionMessage::History { response: tx })
                .await
                .is_ok()
            {
                if let Ok(history) = rx.await {
                    return Ok(history);
                }
            }
        }
        let session = self
            .store
            .load(id)
            .await?
            .ok_or(ServiceError::SessionNotFound)?;
        Ok(session.history().to_vec())
    }

    /// Views of every session the store still considers active.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] if the store cannot be read.
    pub async fn active_sessions(&self) -> ServiceResult<Vec<SessionView>> {
        let active = self.store.active_sessions().await?;
        Ok(active.iter().map(GameSession::view).collect())
    }

    /// Number of actors currently accepting requests.
    pub async fn live_session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.values().filter(|h| !h.is_closed()).count()
    }

    async fn live_handle(&self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drops the tracked handle for `id` if its actor has stopped.
    async fn prune_closed(&self, id: SessionId) {
        let mut sessions = self.sessions.write().await;
        if sessions.get(&id).is_some_and(SessionHandle::is_closed) {
            sessions.remove(&id);
        }
    }

    /// Returns the live handle for the session, spawning an actor when
    /// none is running. The double check under the write lock keeps two
    /// concurrent revivals from racing into two actors.
    async fn spawn_or_get(&self, session: GameSession) -> SessionHandle {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&session.id()) {
            if !existing.is_closed() {
                return existing.clone();
            }
        }
        let (actor, handle) = SessionActor::new(
            session,
            self.registry.clone(),
            self.store.clone(),
            self.scores.clone(),
            self.dispatcher.clone(),
        );
        sessions.insert(handle.session_id(), handle.clone());
        drop(sessions);

        tokio::spawn(async move {
            actor.run().await;
        });
        handle
    }
}
