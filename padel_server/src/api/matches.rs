//! Match API handlers: the bracket view and result entry.

use super::request_id::RequestId;
use super::{ApiResult, AppState};
use crate::{logging, metrics};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use padel::tournament::{BracketView, MatchId, MatchResult, ResultOutcome, TournamentId};
use std::time::Instant;

/// Matches grouped by round, each ordered by match number.
///
/// Empty slots are shown as `BYE` in the first round and `TBD` later.
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<BracketView>> {
    Ok(Json(state.tournaments.bracket(tournament_id).await?))
}

/// Record a match result (admin).
///
/// # Request Body
///
/// ```json
/// {
///   "set1_player1": 6, "set1_player2": 4,
///   "set2_player1": 3, "set2_player2": 6,
///   "set3_player1": 7, "set3_player2": 5,
///   "winner_id": 12
/// }
/// ```
///
/// `winner_id` is the registration ID of one of the two competitors. The third
/// set is optional. Recording the final finishes the tournament and awards
/// ranking points.
pub async fn record_result(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(match_id): Path<MatchId>,
    payload: Result<Json<MatchResult>, JsonRejection>,
) -> ApiResult<Json<ResultOutcome>> {
    let Json(result) = payload?;
    let started = Instant::now();

    let outcome = state.tournaments.record_result(match_id, result).await?;

    metrics::match_results_total();
    if outcome.tournament_finished {
        metrics::tournaments_finished_total();
        for award in &outcome.awards {
            metrics::points_awarded(award.points);
        }
        tracing::info!(
            request_id = %request_id.as_str(),
            "Match {} decided the tournament; {} awards made",
            match_id,
            outcome.awards.len()
        );
    }
    logging::log_performance(
        "record_result",
        started.elapsed().as_millis() as u64,
        Some(request_id.as_str()),
    );

    Ok(Json(outcome))
}
