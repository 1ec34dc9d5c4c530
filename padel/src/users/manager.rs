//! User manager: profile reads and updates, role changes and deletion.

use super::{
    errors::{UserError, UserResult},
    models::UserUpdate,
};
use crate::auth::{
    AuthError, Role, User, UserId,
    manager::{normalize_email, validate_name},
};
use crate::db::UserRepository;
use std::sync::Arc;

/// User manager
#[derive(Clone)]
pub struct UserManager {
    repository: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// List every account (admin only)
    ///
    /// # Errors
    ///
    /// * `UserError::Forbidden` - caller is not an admin
    pub async fn list_users(&self, caller: &User) -> UserResult<Vec<User>> {
        require_admin(caller)?;
        self.repository.list_users().await
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: UserId) -> UserResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))
    }

    /// Update a profile.
    ///
    /// # Arguments
    ///
    /// * `caller` - Authenticated user; must be the target or an admin
    /// * `user_id` - Account to update
    /// * `update` - Fields to change; at least one must be set
    ///
    /// # Errors
    ///
    /// * `UserError::Forbidden` - caller is neither the target nor an admin
    /// * `UserError::NoChanges` - no field set
    /// * `UserError::InvalidInput` - empty name or malformed email
    /// * `UserError::EmailTaken` - email used by another account
    /// * `UserError::NotFound` - no such user
    pub async fn update_user(
        &self,
        caller: &User,
        user_id: UserId,
        update: UserUpdate,
    ) -> UserResult<User> {
        if caller.id != user_id && !caller.is_admin() {
            return Err(UserError::Forbidden("Cannot update other users".to_string()));
        }
        if update.is_empty() {
            return Err(UserError::NoChanges);
        }

        let update = UserUpdate {
            first_name: update
                .first_name
                .as_deref()
                .map(|name| validate_name("First name", name).map(str::to_string))
                .transpose()
                .map_err(input_error)?,
            last_name: update
                .last_name
                .as_deref()
                .map(|name| validate_name("Last name", name).map(str::to_string))
                .transpose()
                .map_err(input_error)?,
            email: update
                .email
                .as_deref()
                .map(normalize_email)
                .transpose()
                .map_err(input_error)?,
        };

        if let Some(email) = &update.email
            && self.repository.email_in_use(email, user_id).await?
        {
            return Err(UserError::EmailTaken);
        }

        let user = self
            .repository
            .update_profile(user_id, &update)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        log::info!("User {} updated profile of user {}", caller.id, user_id);
        Ok(user)
    }

    /// Delete an account (admin only).
    ///
    /// Registrations and history go with the account. Accounts entered in a
    /// tournament that is in progress or finished cannot be deleted: the
    /// bracket's matches point at their registration.
    ///
    /// # Errors
    ///
    /// * `UserError::Forbidden` - caller is not an admin
    /// * `UserError::InDrawnTournament` - user is entered in a drawn tournament
    /// * `UserError::NotFound` - no such user
    pub async fn delete_user(&self, caller: &User, user_id: UserId) -> UserResult<()> {
        require_admin(caller)?;

        if !self.repository.delete_user(user_id).await? {
            return Err(UserError::NotFound(user_id));
        }

        log::warn!("Admin {} deleted user {}", caller.id, user_id);
        Ok(())
    }

    /// Promote a user to admin (admin only)
    pub async fn make_admin(&self, caller: &User, user_id: UserId) -> UserResult<User> {
        require_admin(caller)?;

        let user = self
            .repository
            .set_role(user_id, Role::Admin)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        log::warn!("Admin {} promoted user {} to admin", caller.id, user_id);
        Ok(user)
    }
}

fn require_admin(caller: &User) -> UserResult<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(UserError::Forbidden("Admin access required".to_string()))
    }
}

fn input_error(e: AuthError) -> UserError {
    match e {
        AuthError::InvalidInput(message) => UserError::InvalidInput(message),
        other => UserError::InvalidInput(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::mock::MockUserRepository;
    use chrono::Utc;

    fn user(id: UserId, role: Role) -> User {
        User {
            id,
            first_name: "Juan".to_string(),
            last_name: format!("Player{id}"),
            email: format!("player{id}@test.com"),
            role,
            total_points: 0,
            tournaments_played: 0,
            created_at: Utc::now(),
        }
    }

    fn manager(repo: MockUserRepository) -> UserManager {
        UserManager::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_list_users_requires_admin() {
        let users = manager(
            MockUserRepository::new()
                .with_user(user(1, Role::Admin))
                .with_user(user(2, Role::User)),
        );

        assert_eq!(users.list_users(&user(1, Role::Admin)).await.unwrap().len(), 2);
        assert!(matches!(
            users.list_users(&user(2, Role::User)).await,
            Err(UserError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let users = manager(MockUserRepository::new());
        assert!(matches!(users.get_user(7).await, Err(UserError::NotFound(7))));
    }

    #[tokio::test]
    async fn test_update_self() {
        let users = manager(MockUserRepository::new().with_user(user(2, Role::User)));
        let updated = users
            .update_user(
                &user(2, Role::User),
                2,
                UserUpdate {
                    first_name: Some("  Carlos ".to_string()),
                    email: Some("Carlos@Test.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.first_name, "Carlos");
        assert_eq!(updated.email, "carlos@test.com");
    }

    #[tokio::test]
    async fn test_update_other_user_forbidden_unless_admin() {
        let users = manager(
            MockUserRepository::new()
                .with_user(user(2, Role::User))
                .with_user(user(3, Role::User)),
        );
        let update = UserUpdate {
            last_name: Some("Gómez".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            users.update_user(&user(3, Role::User), 2, update.clone()).await,
            Err(UserError::Forbidden(_))
        ));
        assert!(users.update_user(&user(1, Role::Admin), 2, update).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_validation() {
        let users = manager(
            MockUserRepository::new()
                .with_user(user(2, Role::User))
                .with_user(user(3, Role::User)),
        );
        let caller = user(2, Role::User);

        assert!(matches!(
            users.update_user(&caller, 2, UserUpdate::default()).await,
            Err(UserError::NoChanges)
        ));
        assert!(matches!(
            users
                .update_user(
                    &caller,
                    2,
                    UserUpdate {
                        first_name: Some("   ".to_string()),
                        ..Default::default()
                    }
                )
                .await,
            Err(UserError::InvalidInput(_))
        ));
        assert!(matches!(
            users
                .update_user(
                    &caller,
                    2,
                    UserUpdate {
                        email: Some("player3@test.com".to_string()),
                        ..Default::default()
                    }
                )
                .await,
            Err(UserError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_delete_user_blocked_once_drawn() {
        let users = manager(
            MockUserRepository::new()
                .with_user(user(2, Role::User))
                .with_user(user(3, Role::User))
                .playing(3),
        );
        let admin = user(1, Role::Admin);

        assert!(matches!(
            users.delete_user(&admin, 3).await,
            Err(UserError::InDrawnTournament)
        ));
        users.delete_user(&admin, 2).await.unwrap();
        assert!(matches!(users.delete_user(&admin, 2).await, Err(UserError::NotFound(2))));
        assert!(matches!(
            users.delete_user(&user(3, Role::User), 3).await,
            Err(UserError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_make_admin() {
        let users = manager(MockUserRepository::new().with_user(user(2, Role::User)));
        let promoted = users.make_admin(&user(1, Role::Admin), 2).await.unwrap();
        assert!(promoted.is_admin());
        assert!(matches!(
            users.make_admin(&user(1, Role::Admin), 9).await,
            Err(UserError::NotFound(9))
        ));
    }
}
