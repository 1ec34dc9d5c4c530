//! Repository trait for user accounts, so the user manager can be tested
//! against an in-memory implementation.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use crate::auth::{Role, User, UserId, models::USER_COLUMNS};
use crate::users::{UserError, UserResult, UserUpdate};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, newest account first
    async fn list_users(&self) -> UserResult<Vec<User>>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> UserResult<Option<User>>;

    /// Whether another account already uses `email` (case-insensitive)
    async fn email_in_use(&self, email: &str, except: UserId) -> UserResult<bool>;

    /// Apply the set fields of `update`; `None` if the user does not exist
    async fn update_profile(&self, user_id: UserId, update: &UserUpdate)
    -> UserResult<Option<User>>;

    /// Change a user's role; `None` if the user does not exist
    async fn set_role(&self, user_id: UserId, role: Role) -> UserResult<Option<User>>;

    /// Delete a user and their registrations; `false` if nothing was deleted.
    ///
    /// Fails with `UserError::InDrawnTournament` when the user is entered in
    /// a tournament whose bracket exists, since its matches reference the
    /// registration.
    async fn delete_user(&self, user_id: UserId) -> UserResult<bool>;
}

/// Default PostgreSQL implementation of `UserRepository`
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list_users(&self) -> UserResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&sql).fetch_all(self.pool.as_ref()).await?;
        Ok(rows.iter().map(User::from_row).collect())
    }

    async fn find_by_id(&self, user_id: UserId) -> UserResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.as_ref().map(User::from_row))
    }

    async fn email_in_use(&self, email: &str, except: UserId) -> UserResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id <> $2) AS taken",
        )
        .bind(email)
        .bind(except)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(row.get("taken"))
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        update: &UserUpdate,
    ) -> UserResult<Option<User>> {
        let sql = format!(
            "UPDATE users
             SET first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 email = COALESCE($4, email),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.email)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.as_ref().map(User::from_row))
    }

    async fn set_role(&self, user_id: UserId, role: Role) -> UserResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(user_id)
            .bind(role.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(row.as_ref().map(User::from_row))
    }

    async fn delete_user(&self, user_id: UserId) -> UserResult<bool> {
        let mut tx = self.pool.begin().await?;

        // User row first: registrations take a key-share lock on it, so no new
        // entry can appear while the tournaments below are checked.
        let exists = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let statuses = sqlx::query(
            r#"
            SELECT t.status
            FROM tournaments t
            JOIN registrations r ON r.tournament_id = t.id
            WHERE r.user_id = $1 OR r.partner_id = $1
            ORDER BY t.id
            FOR UPDATE OF t
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;
        let drawn = statuses
            .iter()
            .any(|row| !matches!(row.get::<String, _>("status").as_str(), "open" | "closed"));
        if drawn {
            return Err(UserError::InDrawnTournament);
        }

        // Keep registration counters in step with the cascade below.
        sqlx::query(
            r#"
            UPDATE tournaments t
            SET current_registrations = current_registrations - sub.n
            FROM (
                SELECT tournament_id, COUNT(*)::INT AS n
                FROM registrations
                WHERE user_id = $1 OR partner_id = $1
                GROUP BY tournament_id
            ) sub
            WHERE t.id = sub.tournament_id
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
