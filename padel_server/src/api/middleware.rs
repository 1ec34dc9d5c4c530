//! Authentication middleware for protected endpoints.
//!
//! [`auth_middleware`] resolves the caller from the `session_token` cookie or,
//! failing that, an `Authorization: Bearer` access token, and injects the
//! loaded [`User`] into request extensions. [`admin_middleware`] runs after it
//! on admin routes.
//!
//! # Extracting the User
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use padel::auth::User;
//!
//! async fn protected_handler(Extension(user): Extension<User>) -> String {
//!     format!("Authenticated as {}", user.full_name())
//! }
//! # let _ = protected_handler;
//! ```

use super::{ApiError, AppState};
use crate::logging::log_security_event;
use axum::{
    extract::{Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::Next,
    response::Response,
};
use padel::auth::{AuthError, User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_token";

/// Value of the session cookie, if sent
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Token from an `Authorization: Bearer` header, if sent
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication middleware that resolves the caller and injects the `User`.
///
/// # Behavior
///
/// - **Valid session cookie**: user loaded from the session
/// - **Otherwise valid bearer token**: user loaded from the token's `sub`
/// - **Neither**: `401 Unauthorized` with `{"error": "Not authenticated"}`
/// - **Expired/invalid token**: `401` with `Token expired` / `Invalid token`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = request.headers();
    let user = state
        .auth
        .authenticate(session_cookie(headers), bearer_token(headers))
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::UserNotFound) {
                log_security_event("deleted_user_token", None, "Credential of a deleted user");
            }
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Reject callers that are not admins with `403 Forbidden`.
///
/// Must run after [`auth_middleware`].
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let Some(user) = request.extensions().get::<User>() else {
        return Err(ApiError::unauthorized());
    };

    if !user.is_admin() {
        log_security_event(
            "forbidden",
            Some(user.id),
            &format!("{} {} requires admin", request.method(), request.uri().path()),
        );
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}
