//! Payment card repository.
//!
//! Every column is encrypted before it reaches the database and decrypted on
//! read. Card number and cardholder name use the per-value-key scheme;
//! expiration month, year and CVV use the fixed-key scheme.

use autohaus_core::UserId;
use sqlx::SqlitePool;

use crate::db::RepositoryError;
use crate::models::Card;
use crate::services::crypto::{self, CryptoError};

/// Repository for stored payment cards.
pub struct CardRepository<'a> {
    pool: &'a SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CardRow {
    user_id: i32,
    card_number: String,
    cardholder_name: String,
    expiration_month: String,
    expiration_year: String,
    cvv: String,
}

impl<'a> CardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a card, encrypting every field.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has a card.
    pub async fn add(&self, card: &Card) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cards (user_id, card_number, cardholder_name,
                                expiration_month, expiration_year, cvv)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(i32::from(card.user_id))
        .bind(crypto::encrypt(&card.card_number))
        .bind(crypto::encrypt(&card.cardholder_name))
        .bind(crypto::encrypt_month(&card.expiration_month))
        .bind(crypto::encrypt_year(&card.expiration_year))
        .bind(crypto::encrypt_cvv(&card.cvv))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::Conflict("user already has a card".to_owned())
            } else {
                RepositoryError::Database(e)
            }
        })?;
        Ok(())
    }

    /// Fetch a user's card, decrypted. Absent cards are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if a stored payload does
    /// not decrypt.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Card>, RepositoryError> {
        let row: Option<CardRow> = sqlx::query_as(
            "SELECT user_id, card_number, cardholder_name,
                    expiration_month, expiration_year, cvv
             FROM cards WHERE user_id = ?",
        )
        .bind(i32::from(user_id))
        .fetch_optional(self.pool)
        .await?;

        row.map(into_card).transpose()
    }

    /// Fetch every stored card, decrypted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_all(&self) -> Result<Vec<Card>, RepositoryError> {
        let rows: Vec<CardRow> = sqlx::query_as(
            "SELECT user_id, card_number, cardholder_name,
                    expiration_month, expiration_year, cvv
             FROM cards ORDER BY user_id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_card).collect()
    }

    /// Whether a user has a stored card.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn exists(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM cards WHERE user_id = ?)")
                .bind(i32::from(user_id))
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Replace a user's card, re-encrypting every field.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no card.
    pub async fn update(&self, card: &Card) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE cards SET card_number = ?, cardholder_name = ?,
                              expiration_month = ?, expiration_year = ?, cvv = ?
             WHERE user_id = ?",
        )
        .bind(crypto::encrypt(&card.card_number))
        .bind(crypto::encrypt(&card.cardholder_name))
        .bind(crypto::encrypt_month(&card.expiration_month))
        .bind(crypto::encrypt_year(&card.expiration_year))
        .bind(crypto::encrypt_cvv(&card.cvv))
        .bind(i32::from(card.user_id))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a user's card.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no card.
    pub async fn delete(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cards WHERE user_id = ?")
            .bind(i32::from(user_id))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Raw stored row for a user, without decryption. Test support.
    #[cfg(test)]
    async fn raw_by_user(&self, user_id: UserId) -> Result<CardRow, RepositoryError> {
        let row: Option<CardRow> = sqlx::query_as(
            "SELECT user_id, card_number, cardholder_name,
                    expiration_month, expiration_year, cvv
             FROM cards WHERE user_id = ?",
        )
        .bind(i32::from(user_id))
        .fetch_optional(self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound)
    }
}

fn into_card(row: CardRow) -> Result<Card, RepositoryError> {
    let decode = |result: Result<String, CryptoError>| {
        result.map_err(|e| RepositoryError::DataCorruption(format!("invalid card payload: {e}")))
    };

    Ok(Card {
        user_id: UserId::from(row.user_id),
        card_number: decode(crypto::decrypt(&row.card_number))?,
        cardholder_name: decode(crypto::decrypt(&row.cardholder_name))?,
        expiration_month: decode(crypto::decrypt_month(&row.expiration_month))?,
        expiration_year: decode(crypto::decrypt_year(&row.expiration_year))?,
        cvv: decode(crypto::decrypt_cvv(&row.cvv))?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
