//! End-to-end signup: pending verification, account creation, login.

use autohaus_core::Email;
use autohaus_integration_tests::test_pool;
use autohaus_storefront::models::{NewUser, VerificationForm};
use autohaus_storefront::services::{
    UserService, VerificationError, VerificationIntent, VerificationStore,
};

fn prospective_user() -> NewUser {
    NewUser {
        first_name: "Anna".to_owned(),
        last_name: "Schmidt".to_owned(),
        email: Email::parse("anna@example.com").unwrap(),
        password: "secret123".to_owned(),
    }
}

fn form_for(code: u16) -> VerificationForm {
    let digits: Vec<String> = code.to_string().chars().map(String::from).collect();
    VerificationForm {
        digit1: Some(digits[0].clone()),
        digit2: Some(digits[1].clone()),
        digit3: Some(digits[2].clone()),
        digit4: Some(digits[3].clone()),
    }
}

#[tokio::test]
async fn account_only_exists_after_code_confirmation() {
    let pool = test_pool().await;
    let users = UserService::new(&pool);
    let store = VerificationStore::new();

    let (token, code) = store.begin(VerificationIntent::SignUp(prospective_user()));

    // Nothing is persisted while the flow is pending.
    let email = Email::parse("anna@example.com").unwrap();
    assert!(!users.email_exists(&email).await.unwrap());

    let VerificationIntent::SignUp(new_user) = store.verify(&token, &form_for(code)).unwrap()
    else {
        panic!("signup flow should yield a signup intent");
    };
    users.register(&new_user).await.unwrap();

    assert!(users.email_exists(&email).await.unwrap());
}

#[tokio::test]
async fn stored_password_is_hashed() {
    let pool = test_pool().await;
    let users = UserService::new(&pool);
    users.register(&prospective_user()).await.unwrap();

    let (stored,): (String,) = sqlx::query_as("SELECT password FROM users WHERE email = ?")
        .bind("anna@example.com")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_ne!(stored, "secret123");
    // SHA-256 digest, base64 encoded: 44 characters.
    assert_eq!(stored.len(), 44);
}

#[tokio::test]
async fn login_works_after_verified_signup() {
    let pool = test_pool().await;
    let users = UserService::new(&pool);
    let store = VerificationStore::new();

    let (token, code) = store.begin(VerificationIntent::SignUp(prospective_user()));
    let VerificationIntent::SignUp(new_user) = store.verify(&token, &form_for(code)).unwrap()
    else {
        panic!("signup flow should yield a signup intent");
    };
    let user_id = users.register(&new_user).await.unwrap();

    let logged_in = users
        .validate_user("anna@example.com", "secret123")
        .await
        .unwrap()
        .expect("credentials should match");
    assert_eq!(logged_in.id, user_id);
}

#[tokio::test]
async fn wrong_code_allows_retry_with_same_token() {
    let store = VerificationStore::new();
    let (token, code) = store.begin(VerificationIntent::SignUp(prospective_user()));
    let wrong = if code == 1000 { 1001 } else { code - 1 };

    assert_eq!(
        store.verify(&token, &form_for(wrong)),
        Err(VerificationError::Mismatch)
    );
    assert!(store.verify(&token, &form_for(code)).is_ok());
}

#[tokio::test]
async fn two_signups_do_not_share_codes() {
    let pool = test_pool().await;
    let users = UserService::new(&pool);
    let store = VerificationStore::new();

    let (token_a, code_a) = store.begin(VerificationIntent::SignUp(prospective_user()));
    let other = NewUser {
        email: Email::parse("ben@example.com").unwrap(),
        first_name: "Ben".to_owned(),
        last_name: "Keller".to_owned(),
        password: "hunter22".to_owned(),
    };
    let (token_b, code_b) = store.begin(VerificationIntent::SignUp(other));

    // Each flow verifies independently with its own token and code.
    let VerificationIntent::SignUp(user_a) = store.verify(&token_a, &form_for(code_a)).unwrap()
    else {
        panic!("expected signup intent");
    };
    let VerificationIntent::SignUp(user_b) = store.verify(&token_b, &form_for(code_b)).unwrap()
    else {
        panic!("expected signup intent");
    };

    users.register(&user_a).await.unwrap();
    users.register(&user_b).await.unwrap();
}
