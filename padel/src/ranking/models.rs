//! Ranking data models.

use crate::auth::UserId;
use crate::bracket::Placement;
use crate::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of the global ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 1-based position
    pub position: u32,
    pub user_id: UserId,
    pub name: String,
    pub total_points: i64,
    pub tournaments_played: i32,
}

/// Points earned in one tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsHistoryEntry {
    pub id: i64,
    pub user_id: UserId,
    /// `None` once the tournament has been deleted
    pub tournament_id: Option<TournamentId>,
    pub tournament_name: String,
    pub placement: Placement,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}
