//! Connection pool settings.

/// Settings for the PostgreSQL connection pool.
///
/// The server assembles this from its own configuration; the
/// [`Default`] value points at a local development database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Largest number of pooled connections
    pub max_connections: u32,

    /// Connections the pool keeps open when idle
    pub min_connections: u32,

    /// Seconds to wait when acquiring a connection
    pub connection_timeout_secs: u64,

    /// Seconds an idle connection may linger before closing
    pub idle_timeout_secs: u64,

    /// Seconds before a pooled connection is recycled
    pub max_lifetime_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/tictactoe_db".to_string(),
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_database() {
        let config = DatabaseConfig::default();
        assert!(config.database_url.contains("tictactoe_db"));
        assert!(config.min_connections <= config.max_connections);
    }
}
