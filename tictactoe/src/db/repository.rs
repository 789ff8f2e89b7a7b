//! Database repositories for players, sessions, and score history.
//!
//! Each repository is a trait so callers can swap the PostgreSQL
//! implementations for the in-memory ones in [`super::memory`] during
//! tests or local development.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::errors::{RegistryError, RegistryResult, StoreError, StoreResult};
use crate::game::{GameSession, GameStatus, Outcome, PlayerName, PlayerRecord, ScoreRecord, SessionId};

/// Registered players and their lifetime win/played counters.
#[async_trait]
pub trait PlayerRegistry: Send + Sync {
    /// Creates a player. Names and emails are unique.
    async fn register(&self, name: &PlayerName, email: &str) -> RegistryResult<PlayerRecord>;

    /// Looks up a player by name.
    async fn resolve(&self, name: &PlayerName) -> RegistryResult<Option<PlayerRecord>>;

    /// Bumps the played counter, and the won counter for a win.
    async fn record_outcome(&self, name: &PlayerName, outcome: Outcome) -> RegistryResult<()>;

    /// Players with at least one completed game, best win rate first.
    async fn rankings(&self) -> RegistryResult<Vec<PlayerRecord>>;
}

/// Persistence for game sessions.
///
/// Sessions are stored whole: `save` replaces the entire state under the
/// session id, so a crash never leaves a half-written session behind.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: SessionId) -> StoreResult<Option<GameSession>>;

    async fn save(&self, session: &GameSession) -> StoreResult<()>;

    /// The active session between two players, regardless of who hosts.
    async fn find_active_by_pair(
        &self,
        a: &PlayerName,
        b: &PlayerName,
    ) -> StoreResult<Option<GameSession>>;

    /// All sessions still marked active, oldest first.
    async fn active_sessions(&self) -> StoreResult<Vec<GameSession>>;

    /// Cheap connectivity check for health reporting.
    async fn ping(&self) -> StoreResult<()>;
}

/// Immutable per-game score records.
#[async_trait]
pub trait ScoreHistory: Send + Sync {
    /// Records a score. Recording the same session twice is a no-op.
    async fn record(&self, score: &ScoreRecord) -> StoreResult<()>;

    /// Scores for every game the player took part in, newest first.
    async fn for_player(&self, name: &PlayerName) -> StoreResult<Vec<ScoreRecord>>;
}

/// Syntactic email check: one `@`, a non-empty local part, and a dotted
/// domain. Deliverability is the mail layer's problem.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// PostgreSQL implementation of [`PlayerRegistry`]
pub struct PgPlayerRegistry {
    pool: PgPool,
}

impl PgPlayerRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerRegistry for PgPlayerRegistry {
    async fn register(&self, name: &PlayerName, email: &str) -> RegistryResult<PlayerRecord> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName);
        }
        if !is_valid_email(email) {
            return Err(RegistryError::InvalidEmail);
        }

        let existing = sqlx::query("SELECT 1 FROM players WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(RegistryError::NameTaken);
        }

        let existing = sqlx::query("SELECT 1 FROM players WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(RegistryError::EmailTaken);
        }

        let row = sqlx::query(
            "INSERT INTO players (name, email) VALUES ($1, $2) RETURNING created_at",
        )
        .bind(name.as_str())
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(PlayerRecord {
            name: name.clone(),
            email: email.to_string(),
            won: 0,
            played: 0,
            created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        })
    }

    async fn resolve(&self, name: &PlayerName) -> RegistryResult<Option<PlayerRecord>> {
        let row = sqlx::query(
            "SELECT name, email, won, played, created_at FROM players WHERE name = $1",
        )
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PlayerRecord {
            name: PlayerName::new(r.get("name")),
            email: r.get("email"),
            won: r.get("won"),
            played: r.get("played"),
            created_at: r.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
        }))
    }

    async fn record_outcome(&self, name: &PlayerName, outcome: Outcome) -> RegistryResult<()> {
        let won_delta: i64 = if outcome.is_win() { 1 } else { 0 };
        let result = sqlx::query(
            "UPDATE players SET played = played + 1, won = won + $2 WHERE name = $1",
        )
        .bind(name.as_str())
        .bind(won_delta)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::PlayerNotFound);
        }
        Ok(())
    }

    async fn rankings(&self) -> RegistryResult<Vec<PlayerRecord>> {
        let rows = sqlx::query(
            "SELECT name, email, won, played, created_at FROM players WHERE played > 0",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut players: Vec<PlayerRecord> = rows
            .iter()
            .map(|r| PlayerRecord {
                name: PlayerName::new(r.get("name")),
                email: r.get("email"),
                won: r.get("won"),
                played: r.get("played"),
                created_at: r.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            })
            .collect();
        players.sort_by(|a, b| {
            b.win_rate()
                .partial_cmp(&a.win_rate())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(players)
    }
}

/// PostgreSQL implementation of [`SessionStore`]
///
/// The full session is serialized to JSON in the `state` column; `host`,
/// `guest`, and `status` are mirrored into their own columns so lookups
/// don't have to decode every row.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: SessionId) -> StoreResult<Option<GameSession>> {
        let row = sqlx::query("SELECT state FROM sessions WHERE id = $1")
            .bind(id.uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let state: String = r.get("state");
                Ok(Some(serde_json::from_str(&state)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &GameSession) -> StoreResult<()> {
        let state = serde_json::to_string(session)?;
        sqlx::query(
            "INSERT INTO sessions (id, host, guest, status, state, started_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (id) DO UPDATE SET status = EXCLUDED.status, state = EXCLUDED.state",
        )
        .bind(session.id().uuid())
        .bind(session.host().as_str())
        .bind(session.guest().as_str())
        .bind(session.status().to_string())
        .bind(state)
        .bind(session.started_at().naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_active_by_pair(
        &self,
        a: &PlayerName,
        b: &PlayerName,
    ) -> StoreResult<Option<GameSession>> {
        let row = sqlx::query(
            "SELECT state FROM sessions WHERE status = $1 \
             AND ((host = $2 AND guest = $3) OR (host = $3 AND guest = $2))",
        )
        .bind(GameStatus::Active.to_string())
        .bind(a.as_str())
        .bind(b.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => {
                let state: String = r.get("state");
                Ok(Some(serde_json::from_str(&state)?))
            }
            None => Ok(None),
        }
    }

    async fn active_sessions(&self) -> StoreResult<Vec<GameSession>> {
        let rows = sqlx::query(
            "SELECT state FROM sessions WHERE status = $1 ORDER BY started_at ASC",
        )
        .bind(GameStatus::Active.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let state: String = row.get("state");
            sessions.push(serde_json::from_str(&state)?);
        }
        Ok(sessions)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// PostgreSQL implementation of [`ScoreHistory`]
pub struct PgScoreHistory {
    pool: PgPool,
}

impl PgScoreHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_outcome(raw: &str) -> StoreResult<Outcome> {
    match raw {
        "Won" => Ok(Outcome::Won),
        "Lost" => Ok(Outcome::Lost),
        "Tied" => Ok(Outcome::Tied),
        "Forfeited" => Ok(Outcome::Forfeited),
        other => Err(StoreError::Corrupt(format!("unknown outcome: {other}"))),
    }
}

#[async_trait]
impl ScoreHistory for PgScoreHistory {
    async fn record(&self, score: &ScoreRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO scores (session_id, host, guest, host_outcome, guest_outcome, ended_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (session_id) DO NOTHING",
        )
        .bind(score.session_id.uuid())
        .bind(score.host.as_str())
        .bind(score.guest.as_str())
        .bind(score.host_outcome.to_string())
        .bind(score.guest_outcome.to_string())
        .bind(score.ended_at.naive_utc())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn for_player(&self, name: &PlayerName) -> StoreResult<Vec<ScoreRecord>> {
        let rows = sqlx::query(
            "SELECT session_id, host, guest, host_outcome, guest_outcome, ended_at \
             FROM scores WHERE host = $1 OR guest = $1 ORDER BY ended_at DESC",
        )
        .bind(name.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut scores = Vec::with_capacity(rows.len());
        for r in &rows {
            scores.push(ScoreRecord {
                session_id: SessionId::from(r.get::<uuid::Uuid, _>("session_id")),
                host: PlayerName::new(r.get("host")),
                guest: PlayerName::new(r.get("guest")),
                host_outcome: parse_outcome(r.get("host_outcome"))?,
                guest_outcome: parse_outcome(r.get("guest_outcome"))?,
                ended_at: r.get::<chrono::NaiveDateTime, _>("ended_at").and_utc(),
            });
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation_accepts_plain_addresses() {
        assert!(is_valid_email("player@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.org"));
    }

    #[test]
    fn test_email_validation_rejects_malformed_addresses() {
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("player@nodot"));
        assert!(!is_valid_email("player@.com"));
        assert!(!is_valid_email("player@example."));
    }

    #[test]
    fn test_outcome_strings_round_trip() {
        for outcome in [Outcome::Won, Outcome::Lost, Outcome::Tied, Outcome::Forfeited] {
            assert_eq!(parse_outcome(&outcome.to_string()).unwrap(), outcome);
        }
    }

    #[test]
    fn test_unknown_outcome_string_is_corrupt() {
        assert!(matches!(
            parse_outcome("Crashed"),
            Err(StoreError::Corrupt(_))
        ));
    }
}
