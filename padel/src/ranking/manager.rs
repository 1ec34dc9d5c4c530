//! Ranking manager.

use super::models::{PointsHistoryEntry, RankingEntry};
use crate::auth::UserId;
use crate::bracket::BracketError;
use crate::db::{TimeoutError, with_default_timeout};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Ranking length when the caller does not ask for one
pub const DEFAULT_RANKING_LIMIT: i64 = 50;

/// Longest ranking served in one request
pub const MAX_RANKING_LIMIT: i64 = 100;

/// Ranking errors
#[derive(Debug, Error)]
pub enum RankingError {
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// A stored placement label is not recognised
    #[error(transparent)]
    Corrupt(#[from] BracketError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Ranking query timed out after {0:?}")]
    Timeout(Duration),
}

impl From<TimeoutError> for RankingError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(after) => RankingError::Timeout(after),
            TimeoutError::Database(e) => RankingError::Database(e),
        }
    }
}

impl RankingError {
    /// Get a client-safe error message
    pub fn client_message(&self) -> String {
        match self {
            RankingError::UserNotFound(_) => "User not found".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

pub type RankingResult<T> = Result<T, RankingError>;

/// Clamp a requested ranking length to `1..=MAX_RANKING_LIMIT`
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT)
}

/// Number rows already in ranking order
fn assign_positions(rows: Vec<(UserId, String, i64, i32)>) -> Vec<RankingEntry> {
    rows.into_iter()
        .zip(1..)
        .map(
            |((user_id, name, total_points, tournaments_played), position)| RankingEntry {
                position,
                user_id,
                name,
                total_points,
                tournaments_played,
            },
        )
        .collect()
}

/// Ranking manager
#[derive(Clone)]
pub struct RankingManager {
    pool: Arc<PgPool>,
}

impl RankingManager {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Users with points, best first.
    ///
    /// Ties on points go to the player with fewer tournaments played, then to
    /// the older account.
    ///
    /// # Arguments
    ///
    /// * `limit` - Requested length; defaults to 50 and is clamped to 1..=100
    pub async fn ranking(&self, limit: Option<i64>) -> RankingResult<Vec<RankingEntry>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, TRIM(first_name || ' ' || last_name) AS name,
                       total_points, tournaments_played
                FROM users
                WHERE total_points > 0
                ORDER BY total_points DESC, tournaments_played ASC, id ASC
                LIMIT $1
                "#,
            )
            .bind(clamp_limit(limit))
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        Ok(assign_positions(
            rows.iter()
                .map(|row| {
                    (
                        row.get("id"),
                        row.get("name"),
                        row.get("total_points"),
                        row.get("tournaments_played"),
                    )
                })
                .collect(),
        ))
    }

    /// Points history of a user, newest first
    ///
    /// # Errors
    ///
    /// * `RankingError::UserNotFound` - no such user
    pub async fn points_history(&self, user_id: UserId) -> RankingResult<Vec<PointsHistoryEntry>> {
        let exists = sqlx::query("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        if exists.is_none() {
            return Err(RankingError::UserNotFound(user_id));
        }

        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, user_id, tournament_id, tournament_name, placement, points, created_at
                FROM points_history
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(user_id)
            .fetch_all(self.pool.as_ref()),
        )
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PointsHistoryEntry {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    tournament_id: row.get("tournament_id"),
                    tournament_name: row.get("tournament_name"),
                    placement: row.get::<String, _>("placement").parse()?,
                    points: row.get("points"),
                    created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
                })
            })
            .collect()
    }
}
