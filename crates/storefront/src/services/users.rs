//! Account operations: credential checks and password changes.

use autohaus_core::{Email, UserId};
use sqlx::SqlitePool;

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};
use crate::services::crypto;
use crate::services::identity::IdRetriever;

/// Account operations on top of [`UserRepository`].
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    pub async fn register(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        self.users.add(user).await
    }

    /// Whether an account with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        self.users.email_exists(email).await
    }

    /// Check submitted credentials against stored accounts.
    ///
    /// Loads all accounts and compares email plus hashed password against
    /// each one. Returns the matching user, or `None` when no account
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn validate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let hash = crypto::hash_password(password);
        let users = self.users.get_all().await?;
        Ok(users
            .into_iter()
            .find(|user| user.email.as_str() == email && user.password_hash == hash))
    }

    /// Fetch an account by id. Absent accounts are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.users.get_by_id(id).await
    }

    /// Fetch an account by email. Absent accounts are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        self.users.get_by_email(email).await
    }

    /// The account behind the identity collaborator, or `None` for
    /// anonymous sessions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_logged_in(
        &self,
        identity: &dyn IdRetriever,
    ) -> Result<Option<User>, RepositoryError> {
        let id = identity.logged_in_user_id();
        if id.is_anonymous() {
            return Ok(None);
        }
        self.users.get_by_id(id).await
    }

    /// Replace an account's password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this id.
    pub async fn change_password(
        &self,
        id: UserId,
        new_password: &str,
    ) -> Result<(), RepositoryError> {
        self.users.update_password(id, new_password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn sample_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Anna".to_owned(),
            last_name: "Schmidt".to_owned(),
            email: Email::parse(email).unwrap(),
            password: "secret123".to_owned(),
        }
    }

    #[tokio::test]
    async fn validate_accepts_correct_credentials() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);
        let id = service.register(&sample_user("anna@example.com")).await.unwrap();

        let user = service
            .validate_user("anna@example.com", "secret123")
            .await
            .unwrap()
            .expect("credentials should match");
        assert_eq!(user.id, id);
    }

    #[tokio::test]
    async fn validate_rejects_wrong_password() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);
        service.register(&sample_user("anna@example.com")).await.unwrap();

        assert!(service
            .validate_user("anna@example.com", "wrong")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn validate_rejects_unknown_email() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);
        service.register(&sample_user("anna@example.com")).await.unwrap();

        assert!(service
            .validate_user("nobody@example.com", "secret123")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn get_logged_in_resolves_session_user() {
        use crate::services::identity::{FixedIdentity, SessionIdentity};

        let pool = test_pool().await;
        let service = UserService::new(&pool);
        let id = service.register(&sample_user("anna@example.com")).await.unwrap();

        let identity = FixedIdentity(id);
        let user = service
            .get_logged_in(&identity)
            .await
            .unwrap()
            .expect("user exists");
        assert_eq!(user.id, id);

        let anonymous = SessionIdentity(None);
        assert!(service.get_logged_in(&anonymous).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn changed_password_invalidates_old_one() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);
        let id = service.register(&sample_user("anna@example.com")).await.unwrap();

        service.change_password(id, "newsecret").await.unwrap();

        assert!(service
            .validate_user("anna@example.com", "secret123")
            .await
            .unwrap()
            .is_none());
        assert!(service
            .validate_user("anna@example.com", "newsecret")
            .await
            .unwrap()
            .is_some());
    }
}
