//! Card storage: encrypted at rest, decrypted on read, one card per user.

use autohaus_core::{Email, UserId};
use autohaus_integration_tests::test_pool;
use autohaus_storefront::db::UserRepository;
use autohaus_storefront::models::{NewCard, NewUser};
use autohaus_storefront::services::{CardService, FixedIdentity};
use sqlx::SqlitePool;

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
async fn no_plaintext_reaches_the_database() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool, "anna@example.com").await;
    let identity = FixedIdentity(user_id);
    let cards = CardService::new(&pool, &identity);

    cards.save_card(sample_card()).await.unwrap();

    let (number, name, month, year, cvv): (String, String, String, String, String) =
        sqlx::query_as(
            "SELECT card_number, cardholder_name, expiration_month, expiration_year, cvv
             FROM cards WHERE user_id = ?",
        )
        .bind(i32::from(user_id))
        .fetch_one(&pool)
        .await
        .unwrap();

    for (stored, plaintext) in [
        (&number, "4111111111111111"),
        (&name, "ANNA SCHMIDT"),
        (&month, "09"),
        (&year, "27"),
        (&cvv, "123"),
    ] {
        assert_ne!(stored, plaintext);
        assert!(!stored.contains(plaintext));
    }
}

#[tokio::test]
async fn read_back_returns_the_submitted_card() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool, "anna@example.com").await;
    let identity = FixedIdentity(user_id);
    let cards = CardService::new(&pool, &identity);

    cards.save_card(sample_card()).await.unwrap();
    let stored = cards.get_card().await.unwrap().expect("card exists");

    assert_eq!(stored.card_number, "4111111111111111");
    assert_eq!(stored.cardholder_name, "ANNA SCHMIDT");
    assert_eq!(stored.expiration_month, "09");
    assert_eq!(stored.expiration_year, "27");
    assert_eq!(stored.cvv, "123");
}

#[tokio::test]
async fn saving_twice_keeps_a_single_row() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool, "anna@example.com").await;
    let identity = FixedIdentity(user_id);
    let cards = CardService::new(&pool, &identity);

    cards.save_card(sample_card()).await.unwrap();
    let mut replacement = sample_card();
    replacement.card_number = "5500000000000004".to_owned();
    cards.save_card(replacement).await.unwrap();

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
    let stored = cards.get_card().await.unwrap().expect("card exists");
    assert_eq!(stored.card_number, "5500000000000004");
}

#[tokio::test]
async fn users_only_see_their_own_card() {
    let pool = test_pool().await;
    let anna = insert_user(&pool, "anna@example.com").await;
    let ben = insert_user(&pool, "ben@example.com").await;

    let anna_identity = FixedIdentity(anna);
    CardService::new(&pool, &anna_identity)
        .save_card(sample_card())
        .await
        .unwrap();

    let ben_identity = FixedIdentity(ben);
    let bens_cards = CardService::new(&pool, &ben_identity);
    assert!(!bens_cards.has_card().await.unwrap());
    assert!(bens_cards.get_card().await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_card_removes_the_row() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool, "anna@example.com").await;
    let identity = FixedIdentity(user_id);
    let cards = CardService::new(&pool, &identity);

    cards.save_card(sample_card()).await.unwrap();
    cards.delete_card().await.unwrap();

    assert!(!cards.has_card().await.unwrap());
    // A second delete is a no-op, not an error.
    cards.delete_card().await.unwrap();
}
