//! Authentication module providing user registration, login, and session management.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - JWT access tokens (7-day expiry by default)
//! - Server-side sessions stored as SHA-256 digests, for the `session_token` cookie
//!
//! ## Example
//!
//! ```no_run
//! use padel::auth::{AuthManager, RegisterRequest};
//! use padel::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string()
//!     );
//!
//!     let request = RegisterRequest {
//!         first_name: "Juan".to_string(),
//!         last_name: "Pérez".to_string(),
//!         email: "juan@test.com".to_string(),
//!         password: "test123".to_string(),
//!     };
//!
//!     let (user, _tokens) = auth.register(request).await?;
//!     println!("Registered user: {}", user.full_name());
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, DEFAULT_TOKEN_DURATION_HOURS, MIN_PASSWORD_LENGTH};
pub use models::{AccessTokenClaims, LoginRequest, RegisterRequest, Role, SessionTokens, User, UserId};
