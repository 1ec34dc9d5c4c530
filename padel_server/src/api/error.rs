//! API error type.
//!
//! Every handler returns `Result<_, ApiError>`. Domain errors are converted
//! with `?` and rendered as `{"error": "..."}` using their client-safe
//! message, so database and token details never reach the client.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use padel::auth::AuthError;
use padel::bracket::BracketError;
use padel::ranking::RankingError;
use padel::tournament::TournamentError;
use padel::users::UserError;
use serde_json::json;

/// Error response with an HTTP status and a client-safe message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Database(_) | AuthError::HashingFailed => {
                tracing::error!("Auth failure: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::UserNotFound
            | AuthError::JwtError(_)
            | AuthError::SessionExpired
            | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        };
        Self::new(status, err.client_message())
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        let status = match &err {
            UserError::Database(e) => {
                tracing::error!("User query failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            UserError::NotFound(_) => StatusCode::NOT_FOUND,
            UserError::Forbidden(_) => StatusCode::FORBIDDEN,
            UserError::EmailTaken => StatusCode::CONFLICT,
            UserError::NoChanges | UserError::InvalidInput(_) | UserError::InDrawnTournament => {
                StatusCode::BAD_REQUEST
            }
        };
        Self::new(status, err.client_message())
    }
}

/// Status for engine errors: data problems are ours, the rest are the caller's
fn bracket_status(err: &BracketError) -> StatusCode {
    match err {
        BracketError::Malformed(_)
        | BracketError::UnknownRound(_)
        | BracketError::UnknownPlacement(_)
        | BracketError::UnknownStatus(_)
        | BracketError::NotFinished => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        let status = match &err {
            TournamentError::Database(_) | TournamentError::Serialization(_) => {
                tracing::error!("Tournament operation failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TournamentError::NotFound(_)
            | TournamentError::MatchNotFound(_)
            | TournamentError::UserNotFound(_)
            | TournamentError::NotRegistered => StatusCode::NOT_FOUND,
            TournamentError::AlreadyRegistered | TournamentError::PartnerAlreadyRegistered => {
                StatusCode::CONFLICT
            }
            TournamentError::InvalidInput(_)
            | TournamentError::NoChanges
            | TournamentError::InvalidStatus(_)
            | TournamentError::TournamentFull
            | TournamentError::InvalidPartner(_) => StatusCode::BAD_REQUEST,
            TournamentError::Bracket(e) => bracket_status(e),
        };
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            err.client_message()
        };
        Self::new(status, message)
    }
}

impl From<RankingError> for ApiError {
    fn from(err: RankingError) -> Self {
        let status = match &err {
            RankingError::UserNotFound(_) => StatusCode::NOT_FOUND,
            _ => {
                tracing::error!("Ranking query failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.client_message())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
