//! Account repository.
//!
//! Passwords are hashed here, at the persistence boundary; callers always
//! pass plaintext and never see a hash except on loaded `User` values.

use autohaus_core::{Email, UserId};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::db::RepositoryError;
use crate::models::{NewUser, User};
use crate::services::crypto;

/// Repository for account data.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    created_at: String,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an account, hashing the password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    pub async fn add(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO users (first_name, last_name, email, password, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(crypto::hash_password(&user.password))
        .bind(Utc::now().to_rfc3339())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict("email already registered".to_owned())
            } else {
                RepositoryError::Database(e)
            }
        })?;

        Ok(UserId::from(row.try_get::<i32, _>("id")?))
    }

    /// Fetch every account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_all(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, password, created_at
             FROM users ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_user).collect()
    }

    /// Fetch an account by id. Absent accounts are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, password, created_at
             FROM users WHERE id = ?",
        )
        .bind(i32::from(id))
        .fetch_optional(self.pool)
        .await?;

        row.map(into_user).transpose()
    }

    /// Fetch an account by email. Absent accounts are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, password, created_at
             FROM users WHERE email = ?",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(into_user).transpose()
    }

    /// Whether an account with this email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
                .bind(email.as_str())
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Replace an account's profile fields and password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this id, or
    /// `Conflict` if the new email belongs to another account.
    pub async fn update(&self, id: UserId, user: &NewUser) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET first_name = ?, last_name = ?, email = ?, password = ?
             WHERE id = ?",
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.email.as_str())
        .bind(crypto::hash_password(&user.password))
        .bind(i32::from(id))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict("email already registered".to_owned())
            } else {
                RepositoryError::Database(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete an account; its stored card cascades. Accounts still
    /// referenced by orders cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this id.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(i32::from(id))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace an account's password, hashing the new plaintext.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this id.
    pub async fn update_password(
        &self,
        id: UserId,
        new_password: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password = ? WHERE id = ?")
            .bind(crypto::hash_password(new_password))
            .bind(i32::from(id))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn into_user(row: UserRow) -> Result<User, RepositoryError> {
    let email = Email::parse(&row.email)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&row.created_at)
        .map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid timestamp in database: {e}"))
        })?
        .with_timezone(&Utc);

    Ok(User {
        id: UserId::from(row.id),
        first_name: row.first_name,
        last_name: row.last_name,
        email,
        password_hash: row.password,
        created_at,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
