//! Tournament API handlers: CRUD, registrations and bracket generation.

use super::request_id::RequestId;
use super::{ApiError, ApiResult, AppState};
use crate::{logging, metrics};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use padel::auth::{User, UserId};
use padel::bracket::SeedingPolicy;
use padel::tournament::{
    BracketSummary, NewTournament, Registration, Tournament, TournamentId, TournamentStatus,
    TournamentUpdate,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Instant;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<TournamentStatus>,
}

/// Optional body of `POST /tournaments/{id}/register`
#[derive(Debug, Default, Deserialize)]
pub struct EntryRequest {
    /// Second player of a pair
    pub partner_id: Option<UserId>,
}

/// Optional body of `POST /tournaments/{id}/generate-bracket`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateBracketRequest {
    #[serde(default)]
    pub seeding: SeedingPolicy,
}

/// Parse a JSON body that may be omitted entirely
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

/// List tournaments, optionally filtered by `?status=open|closed|in_progress|finished`
pub async fn list_tournaments(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Tournament>>> {
    let Query(query) = query?;
    Ok(Json(state.tournaments.list_tournaments(query.status).await?))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Tournament>> {
    Ok(Json(state.tournaments.get_tournament(tournament_id).await?))
}

/// Create a tournament (admin).
///
/// # Request Body
///
/// ```json
/// {"name": "Copa Navidad", "category": "5ta", "date": "2024-12-22", "capacity": 8}
/// ```
///
/// Capacity must be a power of two between 2 and 32.
pub async fn create_tournament(
    State(state): State<AppState>,
    payload: Result<Json<NewTournament>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Tournament>)> {
    let Json(request) = payload?;
    let tournament = state.tournaments.create_tournament(request).await?;
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Partial update (admin)
pub async fn update_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
    payload: Result<Json<TournamentUpdate>, JsonRejection>,
) -> ApiResult<Json<Tournament>> {
    let Json(update) = payload?;
    Ok(Json(
        state
            .tournaments
            .update_tournament(tournament_id, update)
            .await?,
    ))
}

/// Delete a tournament with its registrations and matches (admin)
pub async fn delete_tournament(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Value>> {
    state.tournaments.delete_tournament(tournament_id).await?;
    tracing::info!("Admin {} deleted tournament {}", caller.id, tournament_id);
    Ok(Json(json!({ "message": "Tournament deleted" })))
}

/// Enter the caller, alone or with `{"partner_id": ...}`
pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tournament_id): Path<TournamentId>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let entry: EntryRequest = optional_json(&body)?;
    let registration = state
        .tournaments
        .register(&user, tournament_id, entry.partner_id)
        .await?;

    metrics::registrations_total(registration.partner_id.is_some());
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registered successfully",
            "registration_id": registration.id,
            "registration": registration,
        })),
    ))
}

/// Withdraw the caller's entry while the tournament is open
pub async fn cancel_registration(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Value>> {
    state
        .tournaments
        .cancel_registration(&user, tournament_id)
        .await?;
    Ok(Json(json!({ "message": "Registration cancelled" })))
}

pub async fn list_registrations(
    State(state): State<AppState>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Vec<Registration>>> {
    Ok(Json(state.tournaments.registrations(tournament_id).await?))
}

/// Whether the caller is entered, alone or as a partner
pub async fn check_registration(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(tournament_id): Path<TournamentId>,
) -> ApiResult<Json<Value>> {
    let registered = state
        .tournaments
        .is_registered(user.id, tournament_id)
        .await?;
    Ok(Json(json!({ "is_registered": registered })))
}

/// Seed the entrants, create every match and start play (admin).
///
/// Body is optional: `{"seeding": "random"}` (default) or `{"seeding": "ranking"}`.
pub async fn generate_bracket(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(tournament_id): Path<TournamentId>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<BracketSummary>)> {
    let request: GenerateBracketRequest = optional_json(&body)?;
    let started = Instant::now();

    let summary = state
        .tournaments
        .generate_bracket(tournament_id, request.seeding)
        .await?;

    metrics::brackets_generated_total(summary.seeding.as_str());
    logging::log_performance(
        "generate_bracket",
        started.elapsed().as_millis() as u64,
        Some(request_id.as_str()),
    );
    Ok((StatusCode::CREATED, Json(summary)))
}
