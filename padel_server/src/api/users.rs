//! User API handlers.

use super::{ApiResult, AppState};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
};
use padel::auth::{User, UserId};
use padel::ranking::PointsHistoryEntry;
use padel::tournament::Tournament;
use padel::users::UserUpdate;
use serde_json::{Value, json};

/// List all users (admin)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.users.list_users(&caller).await?))
}

/// Get a user profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.get_user(user_id).await?))
}

/// Update first name, last name or email.
///
/// Players may only update themselves; admins may update anyone.
///
/// # Request Body
///
/// ```json
/// {"first_name": "Juan", "email": "juan.martin@test.com"}
/// ```
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(user_id): Path<UserId>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(update) = payload?;
    Ok(Json(state.users.update_user(&caller, user_id, update).await?))
}

/// Delete a user (admin); their registrations go with them
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Value>> {
    state.users.delete_user(&caller, user_id).await?;
    tracing::info!("Admin {} deleted user {}", caller.id, user_id);
    Ok(Json(json!({ "message": "User deleted" })))
}

/// Promote a user to admin (admin)
pub async fn make_admin(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Value>> {
    let user = state.users.make_admin(&caller, user_id).await?;
    tracing::info!("Admin {} promoted user {}", caller.id, user.id);
    Ok(Json(json!({ "message": "User promoted to admin", "user": user })))
}

/// Tournaments the user is entered in, as registrant or partner
pub async fn user_tournaments(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<Tournament>>> {
    state.users.get_user(user_id).await?;
    Ok(Json(state.tournaments.tournaments_for_user(user_id).await?))
}

/// Points history, newest first
pub async fn points_history(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Json<Vec<PointsHistoryEntry>>> {
    Ok(Json(state.ranking.points_history(user_id).await?))
}
