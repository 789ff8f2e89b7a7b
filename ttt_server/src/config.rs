//! Server configuration assembled from CLI overrides and environment
//! variables, with validation up front so bad settings fail at startup
//! instead of mid-game.

use std::{env, net::SocketAddr, str::FromStr};

use tictactoe::DatabaseConfig;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost/tictactoe_db";
const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 3600;
const DEFAULT_NOTIFICATION_CAPACITY: usize = 256;

/// Configuration errors raised during startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Everything the server needs to run
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    pub bind: SocketAddr,

    /// Address for the Prometheus exporter, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,

    /// Database connection settings
    pub database: DatabaseConfig,

    /// Seconds between move-reminder sweeps
    pub reminder_interval_secs: u64,

    /// Bound of the in-process notification channel
    pub notification_capacity: usize,
}

/// Parse an environment variable, falling back to a default when the
/// variable is unset or unparsable.
fn parse_env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

fn parse_addr(var: &str, raw: &str) -> Result<SocketAddr, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        var: var.to_string(),
        reason: format!("not a socket address: {raw}"),
    })
}

impl ServerConfig {
    /// Builds the configuration. CLI overrides beat environment
    /// variables, which beat built-in defaults.
    ///
    /// Environment variables:
    /// - `SERVER_BIND`: HTTP listen address (default: 127.0.0.1:8080)
    /// - `METRICS_BIND`: Prometheus exporter address (unset = disabled)
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `DB_MAX_CONNECTIONS` / `DB_MIN_CONNECTIONS` / `DB_CONNECTION_TIMEOUT`
    ///   / `DB_IDLE_TIMEOUT` / `DB_MAX_LIFETIME`: pool settings
    /// - `REMINDER_INTERVAL_SECS`: seconds between reminder sweeps (default: 3600)
    /// - `NOTIFICATION_CAPACITY`: notification channel bound (default: 256)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an address variable does not
    /// parse.
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(addr) => addr,
            None => {
                let raw = env::var("SERVER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
                parse_addr("SERVER_BIND", &raw)?
            }
        };

        let metrics_bind = match env::var("METRICS_BIND") {
            Ok(raw) => Some(parse_addr("METRICS_BIND", &raw)?),
            Err(_) => None,
        };

        let database_url = database_url_override
            .or_else(|| env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let database = DatabaseConfig {
            database_url,
            max_connections: parse_env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_env_or("DB_MIN_CONNECTIONS", 5),
            connection_timeout_secs: parse_env_or("DB_CONNECTION_TIMEOUT", 10),
            idle_timeout_secs: parse_env_or("DB_IDLE_TIMEOUT", 600),
            max_lifetime_secs: parse_env_or("DB_MAX_LIFETIME", 1800),
        };

        Ok(Self {
            bind,
            metrics_bind,
            database,
            reminder_interval_secs: parse_env_or(
                "REMINDER_INTERVAL_SECS",
                DEFAULT_REMINDER_INTERVAL_SECS,
            ),
            notification_capacity: parse_env_or(
                "NOTIFICATION_CAPACITY",
                DEFAULT_NOTIFICATION_CAPACITY,
            ),
        })
    }

    /// Checks cross-field constraints, returning the first violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reminder_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REMINDER_INTERVAL_SECS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid {
                var: "NOTIFICATION_CAPACITY".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                var: "DB_MIN_CONNECTIONS".to_string(),
                reason: "must not exceed DB_MAX_CONNECTIONS".to_string(),
            });
        }
        Ok(())
    }
}
