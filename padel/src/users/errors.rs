//! User management error types.

use crate::auth::UserId;
use thiserror::Error;

/// User management errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("User not found: {0}")]
    NotFound(UserId),

    /// Caller may not act on this account
    #[error("{0}")]
    Forbidden(String),

    #[error("No fields to update")]
    NoChanges,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    EmailTaken,

    /// Entered in a tournament that is in progress or finished
    #[error("User is entered in a tournament that has already been drawn")]
    InDrawnTournament,
}

impl UserError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            UserError::Database(_) => "Internal server error".to_string(),
            UserError::NotFound(_) => "User not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for user management operations
pub type UserResult<T> = Result<T, UserError>;
