//! Persistence error types.

use thiserror::Error;

/// Player registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Player not found
    #[error("Player not found")]
    PlayerNotFound,

    /// Name already registered
    #[error("A player with that name already exists")]
    NameTaken,

    /// Email already registered
    #[error("A player with that email already exists")]
    EmailTaken,

    /// Email address failed validation
    #[error("Invalid email address")]
    InvalidEmail,

    /// Name empty after sanitization
    #[error("A player name is required")]
    InvalidName,
}

impl RegistryError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        match self {
            // Sanitize database errors - don't expose SQL details
            RegistryError::Database(_) => "Internal server error".to_string(),
            // All other errors are safe to expose
            _ => self.to_string(),
        }
    }
}

/// Session and score storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored session state could not be decoded
    #[error("Corrupt session state: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row held a value outside the expected domain
    #[error("Corrupt stored value: {0}")]
    Corrupt(String),
}

impl StoreError {
    /// Get a client-safe error message that doesn't leak sensitive information
    pub fn client_message(&self) -> String {
        "Internal server error".to_string()
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
