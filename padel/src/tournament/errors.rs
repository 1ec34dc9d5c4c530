//! Tournament error types.

use super::models::{MatchId, TournamentId};
use crate::auth::UserId;
use crate::bracket::BracketError;
use thiserror::Error;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("{0}")]
    InvalidInput(String),

    #[error("No fields to update")]
    NoChanges,

    /// Operation not allowed in the tournament's current status
    #[error("{0}")]
    InvalidStatus(String),

    #[error("Tournament is full")]
    TournamentFull,

    #[error("Already registered")]
    AlreadyRegistered,

    #[error("Partner is already registered in this tournament")]
    PartnerAlreadyRegistered,

    #[error("{0}")]
    InvalidPartner(String),

    #[error("Registration not found")]
    NotRegistered,

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TournamentError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Database(_) | TournamentError::Serialization(_) => {
                "Internal server error".to_string()
            }
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            TournamentError::MatchNotFound(_) => "Match not found".to_string(),
            TournamentError::UserNotFound(_) => "User not found".to_string(),
            TournamentError::Bracket(BracketError::Malformed(_)) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
