//! Card management bound to the current session user.

use sqlx::SqlitePool;

use crate::db::{CardRepository, RepositoryError};
use crate::models::{Card, NewCard};
use crate::services::identity::IdRetriever;

/// Card operations scoped to whoever the identity collaborator reports as
/// logged in. The submitted card's owner is always overwritten with the
/// session user, so a client cannot attach a card to someone else.
pub struct CardService<'a> {
    cards: CardRepository<'a>,
    identity: &'a dyn IdRetriever,
}

impl<'a> CardService<'a> {
    #[must_use]
    pub fn new(pool: &'a SqlitePool, identity: &'a dyn IdRetriever) -> Self {
        Self {
            cards: CardRepository::new(pool),
            identity,
        }
    }

    /// Store the current user's card, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure.
    pub async fn save_card(&self, card: NewCard) -> Result<(), RepositoryError> {
        let card = card.for_user(self.identity.logged_in_user_id());
        if self.cards.exists(card.user_id).await? {
            self.cards.update(&card).await
        } else {
            self.cards.add(&card).await
        }
    }

    /// The current user's card, decrypted. Absent cards are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_card(&self) -> Result<Option<Card>, RepositoryError> {
        self.cards
            .get_by_user(self.identity.logged_in_user_id())
            .await
    }

    /// Whether the current user has a stored card.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn has_card(&self) -> Result<bool, RepositoryError> {
        self.cards.exists(self.identity.logged_in_user_id()).await
    }

    /// Delete the current user's card. A no-op when none is stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn delete_card(&self) -> Result<(), RepositoryError> {
        match self.cards.delete(self.identity.logged_in_user_id()).await {
            Err(RepositoryError::NotFound) => Ok(()),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use autohaus_core::{Email, UserId};

    use super::*;
    use crate::db::{UserRepository, test_pool};
    use crate::models::NewUser;
    use crate::services::identity::FixedIdentity;

    async fn insert_user(pool: &SqlitePool, email: &str) -> UserId {
        UserRepository::new(pool)
            .add(&NewUser {
                first_name: "Anna".to_owned(),
                last_name: "Schmidt".to_owned(),
                email: Email::parse(email).unwrap(),
                password: "secret123".to_owned(),
            })
            .await
            .unwrap()
    }

    fn sample_card() -> NewCard {
        NewCard {
            card_number: "4111111111111111".to_owned(),
            cardholder_name: "ANNA SCHMIDT".to_owned(),
            expiration_month: "09".to_owned(),
            expiration_year: "27".to_owned(),
            cvv: "123".to_owned(),
        }
    }

    #[tokio::test]
    async fn save_attaches_session_user() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "anna@example.com").await;
        let identity = FixedIdentity(user_id);
        let service = CardService::new(&pool, &identity);

        service.save_card(sample_card()).await.unwrap();

        let stored = service.get_card().await.unwrap().expect("card exists");
        assert_eq!(stored.user_id, user_id);
    }

    #[tokio::test]
    async fn save_replaces_existing_card() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "anna@example.com").await;
        let identity = FixedIdentity(user_id);
        let service = CardService::new(&pool, &identity);

        service.save_card(sample_card()).await.unwrap();
        let mut replacement = sample_card();
        replacement.card_number = "5500000000000004".to_owned();
        service.save_card(replacement).await.unwrap();

        let stored = service.get_card().await.unwrap().expect("card exists");
        assert_eq!(stored.card_number, "5500000000000004");
    }

    #[tokio::test]
    async fn delete_without_card_is_noop() {
        let pool = test_pool().await;
        let user_id = insert_user(&pool, "anna@example.com").await;
        let identity = FixedIdentity(user_id);
        let service = CardService::new(&pool, &identity);

        service.delete_card().await.unwrap();
        assert!(!service.has_card().await.unwrap());
    }
}
