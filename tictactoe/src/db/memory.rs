//! In-memory repository implementations.
//!
//! Back the same traits as the PostgreSQL repositories with plain maps.
//! Used by the test suites and handy for running a server without a
//! database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::{
    errors::{RegistryError, RegistryResult, StoreResult},
    repository::{is_valid_email, PlayerRegistry, ScoreHistory, SessionStore},
};
use crate::game::{GameSession, GameStatus, Outcome, PlayerName, PlayerRecord, ScoreRecord, SessionId};

/// Map-backed [`PlayerRegistry`]
#[derive(Default)]
pub struct MemoryPlayerRegistry {
    players: Mutex<HashMap<PlayerName, PlayerRecord>>,
}

impl MemoryPlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests to seed a player with preset counters.
    pub async fn with_player(self, name: &str, email: &str, won: i64, played: i64) -> Self {
        let name = PlayerName::new(name);
        let record = PlayerRecord {
            name: name.clone(),
            email: email.to_string(),
            won,
            played,
            created_at: Utc::now(),
        };
        self.players.lock().await.insert(name, record);
        self
    }
}

#[async_trait]
impl PlayerRegistry for MemoryPlayerRegistry {
    async fn register(&self, name: &PlayerName, email: &str) -> RegistryResult<PlayerRecord> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }
        if !is_valid_email(email) {
            return Err(RegistryError::InvalidEmail);
        }

        let mut players = self.players.lock().await;
        if players.contains_key(name) {
            return Err(RegistryError::NameTaken);
        }
        if players.values().any(|p| p.email == email) {
            return Err(RegistryError::EmailTaken);
        }

        let record = PlayerRecord {
            name: name.clone(),
            email: email.to_string(),
            won: 0,
            played: 0,
            created_at: Utc::now(),
        };
        players.insert(name.clone(), record.clone());
        Ok(record)
    }

    async fn resolve(&self, name: &PlayerName) -> RegistryResult<Option<PlayerRecord>> {
        Ok(self.players.lock().await.get(name).cloned())
    }

    async fn record_outcome(&self, name: &PlayerName, outcome: Outcome) -> RegistryResult<()> {
        let mut players = self.players.lock().await;
        let player = players.get_mut(name).ok_or(RegistryError::PlayerNotFound)?;
        player.played += 1;
        if outcome.is_win() {
            player.won += 1;
        }
        Ok(())
    }

    async fn rankings(&self) -> RegistryResult<Vec<PlayerRecord>> {
        let players = self.players.lock().await;
        let mut ranked: Vec<PlayerRecord> = players
            .values()
            .filter(|p| p.played > 0)
            .cloned()
            .collect();
        ranked.sort_by(|a, b| {
            b.win_rate()
                .partial_cmp(&a.win_rate())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranked)
    }
}

/// Map-backed [`SessionStore`]
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, GameSession>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: SessionId) -> StoreResult<Option<GameSession>> {
        Ok(self.sessions.lock().await.get(&id).cloned())
    }

    async fn save(&self, session: &GameSession) -> StoreResult<()> {
        self.sessions
            .lock()
            .await
            .insert(session.id(), session.clone());
        Ok(())
    }

    async fn find_active_by_pair(
        &self,
        a: &PlayerName,
        b: &PlayerName,
    ) -> StoreResult<Option<GameSession>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .values()
            .find(|s| {
                s.status() == GameStatus::Active
                    && ((s.host() == a && s.guest() == b) || (s.host() == b && s.guest() == a))
            })
            .cloned())
    }

    async fn active_sessions(&self) -> StoreResult<Vec<GameSession>> {
        let sessions = self.sessions.lock().await;
        let mut active: Vec<GameSession> = sessions
            .values()
            .filter(|s| s.status() == GameStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(GameSession::started_at);
        Ok(active)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Map-backed [`ScoreHistory`]
#[derive(Default)]
pub struct MemoryScoreHistory {
    scores: Mutex<HashMap<SessionId, ScoreRecord>>,
}

impl MemoryScoreHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreHistory for MemoryScoreHistory {
    async fn record(&self, score: &ScoreRecord) -> StoreResult<()> {
        self.scores
            .lock()
            .await
            .entry(score.session_id)
            .or_insert_with(|| score.clone());
        Ok(())
    }

    async fn for_player(&self, name: &PlayerName) -> StoreResult<Vec<ScoreRecord>> {
        let scores = self.scores.lock().await;
        let mut found: Vec<ScoreRecord> = scores
            .values()
            .filter(|s| s.host == *name || s.guest == *name)
            .cloned()
            .collect();
        found.sort_by_key(|s| std::cmp::Reverse(s.ended_at));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Completion;

    #[tokio::test]
    async fn test_register_and_resolve() {
        let registry = MemoryPlayerRegistry::new();
        let name = PlayerName::new("alice");

        let record = registry.register(&name, "alice@example.com").await.unwrap();
        assert_eq!(record.played, 0);

        let resolved = registry.resolve(&name).await.unwrap();
        assert_eq!(resolved.unwrap().email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_name() {
        let registry = MemoryPlayerRegistry::new();
        let name = PlayerName::new("alice");

        registry.register(&name, "alice@example.com").await.unwrap();
        let result = registry.register(&name, "other@example.com").await;
        assert!(matches!(result, Err(RegistryError::NameTaken)));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let registry = MemoryPlayerRegistry::new();
        registry
            .register(&PlayerName::new("alice"), "shared@example.com")
            .await
            .unwrap();

        let result = registry
            .register(&PlayerName::new("bob"), "shared@example.com")
            .await;
        assert!(matches!(result, Err(RegistryError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_email() {
        let registry = MemoryPlayerRegistry::new();
        let result = registry.register(&PlayerName::new("alice"), "nonsense").await;
        assert!(matches!(result, Err(RegistryError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_name() {
        let registry = MemoryPlayerRegistry::new();
        let result = registry
            .register(&PlayerName::new("   "), "ok@example.com")
            .await;
        assert!(matches!(result, Err(RegistryError::InvalidName)));
    }

    #[tokio::test]
    async fn test_record_outcome_bumps_counters() {
        let registry = MemoryPlayerRegistry::new();
        let name = PlayerName::new("alice");
        registry.register(&name, "alice@example.com").await.unwrap();

        registry.record_outcome(&name, Outcome::Won).await.unwrap();
        registry.record_outcome(&name, Outcome::Lost).await.unwrap();
        registry.record_outcome(&name, Outcome::Tied).await.unwrap();

        let player = registry.resolve(&name).await.unwrap().unwrap();
        assert_eq!(player.played, 3);
        assert_eq!(player.won, 1);
    }

    #[tokio::test]
    async fn test_record_outcome_for_unknown_player_fails() {
        let registry = MemoryPlayerRegistry::new();
        let result = registry
            .record_outcome(&PlayerName::new("ghost"), Outcome::Won)
            .await;
        assert!(matches!(result, Err(RegistryError::PlayerNotFound)));
    }

    #[tokio::test]
    async fn test_rankings_sorted_by_win_rate() {
        let registry = MemoryPlayerRegistry::new()
            .with_player("rookie", "rookie@example.com", 1, 4)
            .await
            .with_player("champion", "champion@example.com", 9, 10)
            .await
            .with_player("idle", "idle@example.com", 0, 0)
            .await;

        let rankings = registry.rankings().await.unwrap();
        assert_eq!(rankings.len(), 2, "players without games are unranked");
        assert_eq!(rankings[0].name.as_str(), "champion");
        assert_eq!(rankings[1].name.as_str(), "rookie");
    }

    #[tokio::test]
    async fn test_save_and_load_session() {
        let store = MemorySessionStore::new();
        let session = GameSession::new(PlayerName::new("alice"), PlayerName::new("bob"));

        store.save(&session).await.unwrap();
        let loaded = store.load(session.id()).await.unwrap().unwrap();
        assert_eq!(loaded.id(), session.id());
        assert_eq!(loaded.turn_holder(), session.guest());
    }

    #[tokio::test]
    async fn test_find_active_by_pair_ignores_order() {
        let store = MemorySessionStore::new();
        let alice = PlayerName::new("alice");
        let bob = PlayerName::new("bob");
        let session = GameSession::new(alice.clone(), bob.clone());
        store.save(&session).await.unwrap();

        let found = store.find_active_by_pair(&bob, &alice).await.unwrap();
        assert_eq!(found.unwrap().id(), session.id());
    }

    #[tokio::test]
    async fn test_completed_sessions_are_not_active() {
        let store = MemorySessionStore::new();
        let alice = PlayerName::new("alice");
        let bob = PlayerName::new("bob");
        let mut session = GameSession::new(alice.clone(), bob.clone());
        session.forfeit(&alice).unwrap();
        store.save(&session).await.unwrap();

        let found = store.find_active_by_pair(&alice, &bob).await.unwrap();
        assert!(found.is_none());
        assert!(store.active_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_score_recording_is_idempotent_per_session() {
        let history = MemoryScoreHistory::new();
        let mut session = GameSession::new(PlayerName::new("alice"), PlayerName::new("bob"));
        let completion = session.forfeit(&PlayerName::new("alice")).unwrap();
        let score = ScoreRecord::from_completion(&session, &completion);

        history.record(&score).await.unwrap();
        history.record(&score).await.unwrap();

        let scores = history.for_player(&PlayerName::new("alice")).await.unwrap();
        assert_eq!(scores.len(), 1, "one record per completed session");
    }

    #[tokio::test]
    async fn test_score_history_covers_hosted_and_guested_games() {
        let history = MemoryScoreHistory::new();
        let alice = PlayerName::new("alice");

        let session = GameSession::new(alice.clone(), PlayerName::new("bob"));
        let score = ScoreRecord::from_completion(&session, &Completion::Tied);
        history.record(&score).await.unwrap();

        let session = GameSession::new(PlayerName::new("carol"), alice.clone());
        let score = ScoreRecord::from_completion(&session, &Completion::Tied);
        history.record(&score).await.unwrap();

        let scores = history.for_player(&alice).await.unwrap();
        assert_eq!(scores.len(), 2);
        assert!(history
            .for_player(&PlayerName::new("bob"))
            .await
            .unwrap()
            .len()
            == 1);
    }
}
