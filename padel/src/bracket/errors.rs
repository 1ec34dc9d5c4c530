//! Bracket error types.

use super::models::{EntrantId, Round};
use thiserror::Error;

/// Bracket errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    /// Not enough entrants to play a bracket
    #[error("Need at least {min} entrants, have {actual}")]
    TooFewEntrants { min: usize, actual: usize },

    /// More entrants than the largest bracket holds
    #[error("A bracket holds at most {max} entrants, have {actual}")]
    TooManyEntrants { max: usize, actual: usize },

    /// Same entrant listed twice
    #[error("Entrant {0} appears more than once")]
    DuplicateEntrant(EntrantId),

    /// Unrecognised round label
    #[error("Unknown round: {0}")]
    UnknownRound(String),

    /// Unrecognised placement label
    #[error("Unknown placement: {0}")]
    UnknownPlacement(String),

    /// Unrecognised match status
    #[error("Unknown match status: {0}")]
    UnknownStatus(String),

    /// No such match in the bracket
    #[error("Match {match_number} not found in {round}")]
    MatchNotFound { round: Round, match_number: u32 },

    /// One or both slots are still waiting for an earlier round
    #[error("Match {match_number} in {round} is still waiting for its competitors")]
    CompetitorsPending { round: Round, match_number: u32 },

    /// Result already recorded
    #[error("Match {match_number} in {round} already has a result")]
    AlreadyCompleted { round: Round, match_number: u32 },

    /// Declared winner is not assigned to the match
    #[error("Winner {winner} is not a competitor in this match")]
    WinnerNotInMatch { winner: EntrantId },

    /// Set scores do not describe a valid match
    #[error("Invalid set scores: {0}")]
    InvalidSets(String),

    /// Persisted matches do not form a bracket
    #[error("Malformed bracket: {0}")]
    Malformed(String),

    /// Placements requested before the final was played
    #[error("Bracket is not finished")]
    NotFinished,
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
