//! Authentication API handlers.
//!
//! Register and login open a server-side session. The session token is set as
//! an HttpOnly `session_token` cookie for browsers, and a JWT access token is
//! returned in the body for API clients.
//!
//! ```bash
//! curl -X POST http://localhost:8001/api/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "juan@test.com", "password": "test123"}'
//! ```

use super::middleware::{SESSION_COOKIE, session_cookie};
use super::{ApiError, ApiResult, AppState};
use crate::{logging, metrics};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use padel::auth::{AuthError, LoginRequest, RegisterRequest, SessionTokens, User};
use serde::Serialize;
use serde_json::json;

/// Body returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// `Set-Cookie` value carrying the session token
pub fn session_cookie_header(token: &str, max_age_secs: i64) -> String {
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Secure; SameSite=None; Path=/; Max-Age={max_age_secs}"
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie_header() -> String {
    session_cookie_header("", 0)
}

fn with_session(state: &AppState, status: StatusCode, user: User, tokens: SessionTokens) -> Response {
    let cookie = session_cookie_header(
        &tokens.session_token,
        state.auth.token_duration().num_seconds(),
    );
    let body = AuthResponse {
        token: tokens.access_token,
        expires_at: tokens.expires_at,
        user,
    };

    let mut response = (status, Json(body)).into_response();
    match HeaderValue::from_str(&cookie) {
        Ok(value) => {
            response.headers_mut().insert(SET_COOKIE, value);
        }
        Err(e) => tracing::error!("Unusable session cookie: {}", e),
    }
    response
}

/// Register a new account and log it in.
///
/// # Request Body
///
/// ```json
/// {"first_name": "Juan", "last_name": "Martín", "email": "juan@test.com", "password": "test123"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: empty names, malformed email, short password
/// - `409 Conflict`: email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let (user, tokens) = state.auth.register(request).await?;

    metrics::accounts_created_total();
    tracing::info!("User {} registered", user.id);
    Ok(with_session(&state, StatusCode::CREATED, user, tokens))
}

/// Authenticate with email and password.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password (same message for both)
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload?;
    let email = request.email.clone();

    match state.auth.login(request).await {
        Ok((user, tokens)) => {
            metrics::login_attempts_total(true);
            Ok(with_session(&state, StatusCode::OK, user, tokens))
        }
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                metrics::login_attempts_total(false);
                logging::log_security_event(
                    "failed_login",
                    None,
                    &format!("Invalid credentials for {}", email),
                );
            }
            Err(e.into())
        }
    }
}

/// Current user
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}

/// Delete the session and clear the cookie.
///
/// A caller authenticated only by bearer token has no session to delete;
/// access tokens simply expire.
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if let Some(token) = session_cookie(&headers) {
        state.auth.logout(token).await?;
    }
    tracing::info!("User {} logged out", user.id);

    let clear = HeaderValue::from_str(&clear_session_cookie_header())
        .map_err(|_| ApiError::internal())?;
    let mut response = Json(json!({ "message": "Logged out successfully" })).into_response();
    response.headers_mut().insert(SET_COOKIE, clear);
    Ok(response)
}
