//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{
        AccessTokenClaims, LoginRequest, RegisterRequest, Role, SessionTokens, USER_COLUMNS, User,
        UserId,
    },
};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

/// Minimum password length accepted on registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Lifetime of access tokens and sessions unless configured otherwise
pub const DEFAULT_TOKEN_DURATION_HOURS: i64 = 7 * 24;

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    pool: Arc<PgPool>,
    pepper: String,
    jwt_secret: String,
    token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(pool: Arc<PgPool>, pepper: String, jwt_secret: String) -> Self {
        Self {
            pool,
            pepper,
            jwt_secret,
            token_duration: Duration::hours(DEFAULT_TOKEN_DURATION_HOURS),
        }
    }

    /// Override the lifetime of access tokens and sessions
    pub fn with_token_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    pub fn token_duration(&self) -> Duration {
        self.token_duration
    }

    /// Register a new user
    ///
    /// The account starts with role `user` and no points. A session is opened
    /// immediately so the client is logged in after registering.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidInput` - Empty names, malformed email or short password
    /// * `AuthError::EmailTaken` - Email already exists (case-insensitive)
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<(User, SessionTokens)> {
        let first_name = validate_name("First name", &request.first_name)?;
        let last_name = validate_name("Last name", &request.last_name)?;
        let email = normalize_email(&request.email)?;
        validate_password(&request.password)?;

        let existing = sqlx::query("SELECT id FROM users WHERE LOWER(email) = $1")
            .bind(&email)
            .fetch_optional(self.pool.as_ref())
            .await?;

        if existing.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash_password(&request.password)?;

        let sql = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(first_name)
            .bind(last_name)
            .bind(&email)
            .bind(&password_hash)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(map_unique_email)?;

        let user = User::from_row(&row);
        log::info!("Registered user {} ({})", user.id, user.email);

        let tokens = self.start_session(&user).await?;
        Ok((user, tokens))
    }

    /// Login a user
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    pub async fn login(&self, request: LoginRequest) -> AuthResult<(User, SessionTokens)> {
        let email = request.email.trim().to_lowercase();

        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE LOWER(email) = $1");
        let row = sqlx::query(&sql)
            .bind(&email)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash: String = row.get("password_hash");
        self.verify_password(&request.password, &password_hash)?;

        let user = User::from_row(&row);
        let tokens = self.start_session(&user).await?;
        Ok((user, tokens))
    }

    /// Issue an access token and persist a new server-side session
    async fn start_session(&self, user: &User) -> AuthResult<SessionTokens> {
        let access_token = self.generate_access_token(user.id, user.role)?;
        let session_token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.token_duration;

        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(hash_session_token(&session_token))
            .bind(user.id)
            .bind(expires_at.naive_utc())
            .execute(self.pool.as_ref())
            .await?;

        Ok(SessionTokens {
            access_token,
            session_token,
            expires_at,
        })
    }

    /// Resolve the caller from a session cookie or a bearer token.
    ///
    /// The session cookie is tried first. An unknown or expired session falls
    /// through to the bearer token.
    ///
    /// # Errors
    ///
    /// * `AuthError::Unauthenticated` - Neither credential is usable
    /// * `AuthError::JwtError` - Bearer token invalid or expired
    /// * `AuthError::UserNotFound` - Token belongs to a deleted user
    pub async fn authenticate(
        &self,
        session_token: Option<&str>,
        bearer: Option<&str>,
    ) -> AuthResult<User> {
        if let Some(token) = session_token {
            match self.session_user(token).await {
                Ok(user) => return Ok(user),
                Err(AuthError::Database(e)) => return Err(AuthError::Database(e)),
                Err(_) => {}
            }
        }

        let token = bearer.ok_or(AuthError::Unauthenticated)?;
        let claims = self.verify_access_token(token)?;
        self.find_user(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Load the user owning a live session
    async fn session_user(&self, token: &str) -> AuthResult<User> {
        let token_hash = hash_session_token(token);
        let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let expires_at = row.get::<chrono::NaiveDateTime, _>("expires_at").and_utc();
        if expires_at <= Utc::now() {
            sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
                .bind(&token_hash)
                .execute(self.pool.as_ref())
                .await?;
            return Err(AuthError::SessionExpired);
        }

        self.find_user(row.get("user_id"))
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Logout by deleting the server-side session
    pub async fn logout(&self, session_token: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(hash_session_token(session_token))
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    /// Find a user by ID
    pub async fn find_user(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.as_ref().map(User::from_row))
    }

    /// Verify an access token
    ///
    /// # Returns
    ///
    /// * `AuthResult<AccessTokenClaims>` - Decoded claims or error
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Hash password with Argon2id + pepper
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    /// Generate JWT access token
    pub(crate) fn generate_access_token(&self, user_id: UserId, role: Role) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user_id,
            role,
            exp: (now + self.token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }
}

/// SHA-256 hex digest under which a session token is stored
fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Map a unique violation on the email index to `EmailTaken`
pub(crate) fn map_unique_email(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
        _ => AuthError::Database(e),
    }
}

/// Trimmed, non-empty name
pub(crate) fn validate_name<'a>(field: &str, value: &'a str) -> AuthResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::InvalidInput(format!("{field} is required")));
    }
    if trimmed.chars().count() > 100 {
        return Err(AuthError::InvalidInput(format!(
            "{field} must be at most 100 characters"
        )));
    }
    Ok(trimmed)
}

/// Lowercased email with a basic `local@domain.tld` shape
pub(crate) fn normalize_email(email: &str) -> AuthResult<String> {
    let email = email.trim().to_lowercase();
    let invalid = || AuthError::InvalidInput("Invalid email address".to_string());

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let shaped = !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);

    if !shaped || email.len() > 255 {
        return Err(invalid());
    }
    Ok(email)
}

/// Validate password length
pub(crate) fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
