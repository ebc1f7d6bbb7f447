//! Order placement and history.

use autohaus_core::{OrderId, UserId};
use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::{OrderRepository, RepositoryError};
use crate::models::{Car, ConfigurationOptions, NewOrder, Order, OrderSummary};
use crate::services::identity::IdRetriever;

/// Order operations scoped to the session user.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    identity: &'a dyn IdRetriever,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub fn new(pool: &'a SqlitePool, identity: &'a dyn IdRetriever) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            identity,
        }
    }

    /// Place an order for the current user, snapshotting the car's price
    /// and the current time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn add_order_logged_in(
        &self,
        car: &Car,
        options: Option<ConfigurationOptions>,
    ) -> Result<OrderId, RepositoryError> {
        self.orders
            .add(&NewOrder {
                car_id: car.id,
                user_id: self.identity.logged_in_user_id(),
                price: car.price,
                order_date: Utc::now(),
                options,
            })
            .await
    }

    /// The current user's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn order_history(&self) -> Result<Vec<OrderSummary>, RepositoryError> {
        self.orders
            .find_by_user(self.identity.logged_in_user_id())
            .await
    }

    /// Fetch an order by id, regardless of owner. Absent orders are
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.orders.get_by_id(id).await
    }

    /// Id the orders will be attributed to.
    #[must_use]
    pub fn acting_user(&self) -> UserId {
        self.identity.logged_in_user_id()
    }
}

#[cfg(test)]
mod tests {
    use autohaus_core::Email;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{CarRepository, UserRepository, test_pool};
    use crate::models::{CarDetail, NewCar, NewUser};
    use crate::services::identity::FixedIdentity;

    async fn seed(pool: &SqlitePool) -> (UserId, Car) {
        let user_id = UserRepository::new(pool)
            .add(&NewUser {
                first_name: "Anna".to_owned(),
                last_name: "Schmidt".to_owned(),
                email: Email::parse("anna@example.com").unwrap(),
                password: "secret123".to_owned(),
            })
            .await
            .unwrap();

        let cars = CarRepository::new(pool);
        let car_id = cars
            .add(&NewCar {
                make: "Volkswagen".to_owned(),
                model: "Golf".to_owned(),
                year: 2022,
                price: Decimal::new(784_000, 0),
                description: "Versatile hatchback with high fuel efficiency".to_owned(),
                detail: CarDetail {
                    color: "Blue".to_owned(),
                    transmission: "Manual".to_owned(),
                    fuel_type: "Gasoline".to_owned(),
                },
                image_urls: vec![],
            })
            .await
            .unwrap();
        let car = cars.get_by_id(car_id).await.unwrap().expect("car exists");
        (user_id, car)
    }

    #[tokio::test]
    async fn order_snapshots_price_and_owner() {
        let pool = test_pool().await;
        let (user_id, car) = seed(&pool).await;
        let identity = FixedIdentity(user_id);
        let service = OrderService::new(&pool, &identity);

        let order_id = service.add_order_logged_in(&car, None).await.unwrap();
        let order = service
            .get_by_id(order_id)
            .await
            .unwrap()
            .expect("order exists");

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.price, car.price);
    }

    #[tokio::test]
    async fn history_only_contains_own_orders() {
        let pool = test_pool().await;
        let (user_id, car) = seed(&pool).await;

        let identity = FixedIdentity(user_id);
        let service = OrderService::new(&pool, &identity);
        service.add_order_logged_in(&car, None).await.unwrap();

        let other = UserRepository::new(&pool)
            .add(&NewUser {
                first_name: "Ben".to_owned(),
                last_name: "Keller".to_owned(),
                email: Email::parse("ben@example.com").unwrap(),
                password: "hunter22".to_owned(),
            })
            .await
            .unwrap();
        let other_identity = FixedIdentity(other);
        let other_service = OrderService::new(&pool, &other_identity);

        assert_eq!(service.order_history().await.unwrap().len(), 1);
        assert!(other_service.order_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn options_are_persisted_with_the_order() {
        let pool = test_pool().await;
        let (user_id, car) = seed(&pool).await;
        let identity = FixedIdentity(user_id);
        let service = OrderService::new(&pool, &identity);

        let options = ConfigurationOptions {
            id: None,
            color: Some("British Green".to_owned()),
            transmission: Some("Manual".to_owned()),
            fuel_type: None,
        };
        let order_id = service
            .add_order_logged_in(&car, Some(options))
            .await
            .unwrap();

        let stored = service
            .get_by_id(order_id)
            .await
            .unwrap()
            .expect("order exists")
            .options
            .unwrap();
        assert_eq!(stored.color.as_deref(), Some("British Green"));
    }
}
