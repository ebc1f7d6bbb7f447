//! Order placement: price snapshot, configurator options, receipt body.

use autohaus_core::{Email, UserId};
use autohaus_integration_tests::test_pool;
use autohaus_storefront::db::{CarRepository, UserRepository, seed::seed_catalog};
use autohaus_storefront::models::{Car, CarInfo, ConfigurationOptions, NewUser};
use autohaus_storefront::services::email::build_order_receipt_bodies;
use autohaus_storefront::services::{FixedIdentity, OrderService, UserService};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

async fn insert_user(pool: &SqlitePool) -> UserId {
    UserRepository::new(pool)
        .add(&NewUser {
            first_name: "Anna".to_owned(),
            last_name: "Schmidt".to_owned(),
            email: Email::parse("anna@example.com").unwrap(),
            password: "secret123".to_owned(),
        })
        .await
        .unwrap()
}

async fn seeded_car(pool: &SqlitePool, model: &str) -> Car {
    seed_catalog(pool).await.unwrap();
    let cars = CarRepository::new(pool).get_all().await.unwrap();
    cars.into_iter()
        .find(|car| car.model == model)
        .expect("model in seed data")
}

#[tokio::test]
async fn order_snapshots_the_listed_price() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool).await;
    let car = seeded_car(&pool, "Taycan").await;

    let identity = FixedIdentity(user_id);
    let orders = OrderService::new(&pool, &identity);
    let order_id = orders.add_order_logged_in(&car, None).await.unwrap();

    let order = orders
        .get_by_id(order_id)
        .await
        .unwrap()
        .expect("order exists");
    assert_eq!(order.price, Decimal::new(3_360_000, 0));
    assert_eq!(order.user_id, user_id);
    assert_eq!(order.car_id, car.id);
}

#[tokio::test]
async fn configurator_options_survive_checkout() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool).await;
    let car = seeded_car(&pool, "Golf").await;

    let identity = FixedIdentity(user_id);
    let orders = OrderService::new(&pool, &identity);
    let options = ConfigurationOptions {
        id: None,
        color: Some("British Green".to_owned()),
        transmission: Some("Manual".to_owned()),
        fuel_type: None,
    };
    let order_id = orders
        .add_order_logged_in(&car, Some(options))
        .await
        .unwrap();

    let stored = orders
        .get_by_id(order_id)
        .await
        .unwrap()
        .expect("order exists")
        .options
        .unwrap();
    assert_eq!(stored.color.as_deref(), Some("British Green"));
    assert_eq!(stored.transmission.as_deref(), Some("Manual"));
    assert_eq!(stored.fuel_type, None);
}

#[tokio::test]
async fn history_lists_orders_newest_first() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool).await;
    let golf = seeded_car(&pool, "Golf").await;
    let taycan = seeded_car(&pool, "Taycan").await;

    let identity = FixedIdentity(user_id);
    let orders = OrderService::new(&pool, &identity);
    orders.add_order_logged_in(&golf, None).await.unwrap();
    orders.add_order_logged_in(&taycan, None).await.unwrap();

    let history = orders.order_history().await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].model, "Taycan");
    assert_eq!(history[1].model, "Golf");
}

#[tokio::test]
async fn receipt_body_names_the_buyer_and_the_car() {
    let pool = test_pool().await;
    let user_id = insert_user(&pool).await;
    let car = seeded_car(&pool, "Huracan").await;
    let user = UserService::new(&pool)
        .get_by_id(user_id)
        .await
        .unwrap()
        .expect("user exists");

    let info = CarInfo {
        make: car.make.clone(),
        model: car.model.clone(),
        year: car.year,
    };
    let (text, html) = build_order_receipt_bodies(&user.full_name(), &info).unwrap();

    assert!(text.contains("Dear Anna Schmidt"));
    assert!(text.contains("Lamborghini Huracan, 2023"));
    assert!(html.contains("<li>Make: Lamborghini</li>"));
    assert!(html.contains("<li>Year: 2023</li>"));
}
