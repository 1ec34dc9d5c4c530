//! HTTP API for the padel tournament server.
//!
//! # Modules
//!
//! - [`auth`]: Register, login, current user and logout
//! - [`users`]: Profiles, admin promotion, a player's tournaments and points history
//! - [`tournaments`]: Tournament CRUD, registrations and bracket generation
//! - [`matches`]: Bracket view and result entry
//! - [`ranking`]: Global ranking
//! - [`middleware`]: Session/bearer authentication and the admin gate
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health                                   - Health check
//!
//! POST   /api/auth/register                        - Register and log in
//! POST   /api/auth/login                           - Login
//! GET    /api/tournaments[?status=]                - List tournaments
//! GET    /api/tournaments/{id}                     - Tournament details
//! GET    /api/tournaments/{id}/matches             - Bracket by round
//! GET    /api/ranking[?limit=]                     - Global ranking
//!
//! GET    /api/auth/me                              - Current user (auth)
//! POST   /api/auth/logout                          - End session (auth)
//! GET    /api/users/{id}                           - User profile (auth)
//! PUT    /api/users/{id}                           - Update profile (self or admin)
//! GET    /api/users/{id}/tournaments               - Tournaments entered (auth)
//! GET    /api/users/{id}/points-history            - Points history (auth)
//! POST   /api/tournaments/{id}/register            - Enter, optionally with a partner (auth)
//! DELETE /api/tournaments/{id}/register            - Withdraw (auth)
//! GET    /api/tournaments/{id}/registrations       - Entrants (auth)
//! GET    /api/registrations/check/{id}             - Am I entered? (auth)
//!
//! GET    /api/users                                - List users (admin)
//! DELETE /api/users/{id}                           - Delete user (admin)
//! POST   /api/users/{id}/make-admin                - Promote (admin)
//! POST   /api/tournaments                          - Create tournament (admin)
//! PUT    /api/tournaments/{id}                     - Update tournament (admin)
//! DELETE /api/tournaments/{id}                     - Delete tournament (admin)
//! POST   /api/tournaments/{id}/generate-bracket    - Seed and start (admin)
//! PUT    /api/matches/{id}/result                  - Record a result (admin)
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use padel::auth::AuthManager;
//! use padel::db::{Database, PgUserRepository};
//! use padel::ranking::RankingManager;
//! use padel::tournament::TournamentManager;
//! use padel::users::UserManager;
//! use padel_server::api::{AppState, create_router};
//! use padel_server::config::CorsOrigins;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Arc::new(Database::new(&Default::default()).await?);
//! let pool = Arc::new(db.pool().clone());
//!
//! let state = AppState {
//!     auth: Arc::new(AuthManager::new(pool.clone(), "pepper".into(), "secret".into())),
//!     users: Arc::new(UserManager::new(Arc::new(PgUserRepository::new(pool.clone())))),
//!     tournaments: Arc::new(TournamentManager::new(pool.clone())),
//!     ranking: Arc::new(RankingManager::new(pool)),
//!     db,
//! };
//!
//! let app = create_router(state, &CorsOrigins::Any);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod error;
pub mod matches;
pub mod middleware;
pub mod ranking;
pub mod request_id;
pub mod tournaments;
pub mod users;

pub use error::{ApiError, ApiResult};

use crate::config::CorsOrigins;
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
};
use padel::auth::AuthManager;
use padel::db::Database;
use padel::ranking::RankingManager;
use padel::tournament::TournamentManager;
use padel::users::UserManager;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub users: Arc<UserManager>,
    pub tournaments: Arc<TournamentManager>,
    pub ranking: Arc<RankingManager>,
    pub db: Arc<Database>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState, cors: &CorsOrigins) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router(state.clone()))
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(cors))
        .with_state(state)
}

fn api_router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/tournaments", get(tournaments::list_tournaments))
        .route("/tournaments/{tournament_id}", get(tournaments::get_tournament))
        .route("/tournaments/{tournament_id}/matches", get(matches::get_bracket))
        .route("/ranking", get(ranking::get_ranking));

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/users/{user_id}", get(users::get_user).put(users::update_user))
        .route("/users/{user_id}/tournaments", get(users::user_tournaments))
        .route("/users/{user_id}/points-history", get(users::points_history))
        .route(
            "/tournaments/{tournament_id}/register",
            post(tournaments::register).delete(tournaments::cancel_registration),
        )
        .route(
            "/tournaments/{tournament_id}/registrations",
            get(tournaments::list_registrations),
        )
        .route(
            "/registrations/check/{tournament_id}",
            get(tournaments::check_registration),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    // Layers run bottom-up: authenticate first, then check the role
    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", axum::routing::delete(users::delete_user))
        .route("/users/{user_id}/make-admin", post(users::make_admin))
        .route("/tournaments", post(tournaments::create_tournament))
        .route(
            "/tournaments/{tournament_id}",
            put(tournaments::update_tournament).delete(tournaments::delete_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/generate-bracket",
            post(tournaments::generate_bracket),
        )
        .route("/matches/{match_id}/result", put(matches::record_result))
        .layer(axum::middleware::from_fn(middleware::admin_middleware))
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
}

/// CORS for browser clients; the session cookie needs credentials allowed,
/// so `*` mirrors the request origin instead of sending a wildcard.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::mirror_request(),
        CorsOrigins::List(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| tracing::warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the database answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8001/health
/// # {"status":"healthy","version":"1.0.0","database":true,"timestamp":"2026-03-01T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            false
        }
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
