//! Global APA ranking and per-user points history.

pub mod manager;
pub mod models;

pub use manager::{
    DEFAULT_RANKING_LIMIT, MAX_RANKING_LIMIT, RankingError, RankingManager, RankingResult,
    clamp_limit,
};
pub use models::{PointsHistoryEntry, RankingEntry};
