//! Database layer: connection management and repositories.
//!
//! [`Database`] owns the PostgreSQL connection pool. The repositories in
//! [`repository`] are traits with both PostgreSQL and in-memory
//! ([`memory`]) implementations.

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub mod config;
pub mod errors;
pub mod memory;
pub mod repository;

pub use config::DatabaseConfig;
pub use errors::{RegistryError, RegistryResult, StoreError, StoreResult};
pub use memory::{MemoryPlayerRegistry, MemoryScoreHistory, MemorySessionStore};
pub use repository::{
    PgPlayerRegistry, PgScoreHistory, PgSessionStore, PlayerRegistry, ScoreHistory, SessionStore,
};

/// A handle to the database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database described by the configuration.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the pool cannot be established.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// The underlying connection pool, for constructing repositories.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Verify the database connection is alive.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the check query fails.
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close all pool connections gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
