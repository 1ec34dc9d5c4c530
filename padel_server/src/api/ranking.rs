//! Ranking API handler.

use super::{ApiResult, AppState};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use padel::ranking::RankingEntry;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    /// Defaults to 50, clamped to 1..=100
    pub limit: Option<i64>,
}

/// Global ranking, best first
pub async fn get_ranking(
    State(state): State<AppState>,
    query: Result<Query<RankingQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<RankingEntry>>> {
    let Query(query) = query?;
    Ok(Json(state.ranking.ranking(query.limit).await?))
}
