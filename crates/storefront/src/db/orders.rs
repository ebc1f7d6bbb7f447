//! Order repository.

use autohaus_core::{CarId, OptionsId, OrderId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::db::{RepositoryError, parse_price};
use crate::models::{ConfigurationOptions, NewOrder, Order, OrderSummary};

/// Repository for orders and their configurator options.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    car_id: i32,
    user_id: i32,
    price: String,
    order_date: String,
    options_id: Option<i32>,
    options_color: Option<String>,
    options_transmission: Option<String>,
    options_fuel_type: Option<String>,
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i32,
    make: String,
    model: String,
    year: i32,
    color: String,
    transmission: String,
    fuel_type: String,
    price: String,
    order_date: String,
    options_id: Option<i32>,
    options_color: Option<String>,
    options_transmission: Option<String>,
    options_fuel_type: Option<String>,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert an order and its configurator options in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn add(&self, order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO orders (car_id, user_id, price, order_date)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(i32::from(order.car_id))
        .bind(i32::from(order.user_id))
        .bind(order.price.to_string())
        .bind(order.order_date.to_rfc3339())
        .fetch_one(&mut *tx)
        .await?;
        let order_id: i32 = row.try_get("id")?;

        if let Some(options) = &order.options {
            sqlx::query(
                "INSERT INTO configuration_options (order_id, color, transmission, fuel_type)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(&options.color)
            .bind(&options.transmission)
            .bind(&options.fuel_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(OrderId::from(order_id))
    }

    /// Fetch an order by id. Absent orders are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            "SELECT o.id, o.car_id, o.user_id, o.price, o.order_date,
                    co.id AS options_id, co.color AS options_color,
                    co.transmission AS options_transmission,
                    co.fuel_type AS options_fuel_type
             FROM orders o
             LEFT JOIN configuration_options co ON co.order_id = o.id
             WHERE o.id = ?",
        )
        .bind(i32::from(id))
        .fetch_optional(self.pool)
        .await?;

        row.map(into_order).transpose()
    }

    /// Fetch a user's order history joined with car data, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Vec<OrderSummary>, RepositoryError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT o.id, c.make, c.model, c.year,
                    d.color, d.transmission, d.fuel_type,
                    o.price, o.order_date,
                    co.id AS options_id, co.color AS options_color,
                    co.transmission AS options_transmission,
                    co.fuel_type AS options_fuel_type
             FROM orders o
             JOIN cars c ON c.id = o.car_id
             JOIN car_detail d ON d.car_id = c.id
             LEFT JOIN configuration_options co ON co.order_id = o.id
             WHERE o.user_id = ?
             ORDER BY o.id DESC",
        )
        .bind(i32::from(user_id))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_summary).collect()
    }

    /// Replace an order's fields and configurator options in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn update(&self, id: OrderId, order: &NewOrder) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE orders SET car_id = ?, user_id = ?, price = ?, order_date = ?
             WHERE id = ?",
        )
        .bind(i32::from(order.car_id))
        .bind(i32::from(order.user_id))
        .bind(order.price.to_string())
        .bind(order.order_date.to_rfc3339())
        .bind(i32::from(id))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM configuration_options WHERE order_id = ?")
            .bind(i32::from(id))
            .execute(&mut *tx)
            .await?;
        if let Some(options) = &order.options {
            sqlx::query(
                "INSERT INTO configuration_options (order_id, color, transmission, fuel_type)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(i32::from(id))
            .bind(&options.color)
            .bind(&options.transmission)
            .bind(&options.fuel_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete an order; its configurator options cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(i32::from(id))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Fetch every order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT o.id, o.car_id, o.user_id, o.price, o.order_date,
                    co.id AS options_id, co.color AS options_color,
                    co.transmission AS options_transmission,
                    co.fuel_type AS options_fuel_type
             FROM orders o
             LEFT JOIN configuration_options co ON co.order_id = o.id
             ORDER BY o.id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(into_order).collect()
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid order date in database: {e}")))
}

fn options_from_columns(
    id: Option<i32>,
    color: Option<String>,
    transmission: Option<String>,
    fuel_type: Option<String>,
) -> Option<ConfigurationOptions> {
    id.map(|id| ConfigurationOptions {
        id: Some(OptionsId::from(id)),
        color,
        transmission,
        fuel_type,
    })
}

fn into_order(row: OrderRow) -> Result<Order, RepositoryError> {
    Ok(Order {
        id: OrderId::from(row.id),
        car_id: CarId::from(row.car_id),
        user_id: UserId::from(row.user_id),
        price: parse_price(&row.price)?,
        order_date: parse_date(&row.order_date)?,
        options: options_from_columns(
            row.options_id,
            row.options_color,
            row.options_transmission,
            row.options_fuel_type,
        ),
    })
}

fn into_summary(row: SummaryRow) -> Result<OrderSummary, RepositoryError> {
    Ok(OrderSummary {
        id: OrderId::from(row.id),
        make: row.make,
        model: row.model,
        year: row.year,
        color: row.color,
        transmission: row.transmission,
        fuel_type: row.fuel_type,
        price: parse_price(&row.price)?,
        order_date: parse_date(&row.order_date)?,
        options: options_from_columns(
            row.options_id,
            row.options_color,
            row.options_transmission,
            row.options_fuel_type,
        ),
    })
}

#[cfg(test)]
mod tests {
    use autohaus_core::Email;
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::{CarRepository, UserRepository, test_pool};
    use crate::models::{CarDetail, NewCar, NewUser};

    async fn seed_user_and_car(pool: &SqlitePool) -> (UserId, CarId) {
        let user_id = UserRepository::new(pool)
            .add(&NewUser {
                first_name: "Anna".to_owned(),
                last_name: "Schmidt".to_owned(),
                email: Email::parse("anna@example.com").unwrap(),
                password: "secret123".to_owned(),
            })
            .await
            .unwrap();

        let car_id = CarRepository::new(pool)
            .add(&NewCar {
                make: "Porsche".to_owned(),
                model: "Taycan".to_owned(),
                year: 2023,
                price: Decimal::new(3_360_000, 0),
                description: "Electric sports car with spectacular performance".to_owned(),
                detail: CarDetail {
                    color: "White".to_owned(),
                    transmission: "Automatic".to_owned(),
                    fuel_type: "Electric".to_owned(),
                },
                image_urls: vec![],
            })
            .await
            .unwrap();

        (user_id, car_id)
    }

    fn new_order(
        user_id: UserId,
        car_id: CarId,
        options: Option<ConfigurationOptions>,
    ) -> NewOrder {
        NewOrder {
            car_id,
            user_id,
            price: Decimal::new(3_360_000, 0),
            order_date: Utc::now(),
            options,
        }
    }

    #[tokio::test]
    async fn add_without_options() {
        let pool = test_pool().await;
        let (user_id, car_id) = seed_user_and_car(&pool).await;
        let repo = OrderRepository::new(&pool);

        let id = repo.add(&new_order(user_id, car_id, None)).await.unwrap();
        let order = repo.get_by_id(id).await.unwrap().expect("order exists");

        assert_eq!(order.price, Decimal::new(3_360_000, 0));
        assert!(order.options.is_none());
    }

    #[tokio::test]
    async fn add_with_options_round_trips() {
        let pool = test_pool().await;
        let (user_id, car_id) = seed_user_and_car(&pool).await;
        let repo = OrderRepository::new(&pool);

        let options = ConfigurationOptions {
            id: None,
            color: Some("Midnight Blue".to_owned()),
            transmission: None,
            fuel_type: Some("Electric".to_owned()),
        };
        let id = repo
            .add(&new_order(user_id, car_id, Some(options)))
            .await
            .unwrap();

        let stored = repo
            .get_by_id(id)
            .await
            .unwrap()
            .expect("order exists")
            .options
            .unwrap();
        assert_eq!(stored.color.as_deref(), Some("Midnight Blue"));
        assert_eq!(stored.transmission, None);
        assert_eq!(stored.fuel_type.as_deref(), Some("Electric"));
    }

    #[tokio::test]
    async fn find_by_user_is_newest_first() {
        let pool = test_pool().await;
        let (user_id, car_id) = seed_user_and_car(&pool).await;
        let repo = OrderRepository::new(&pool);

        let first = repo.add(&new_order(user_id, car_id, None)).await.unwrap();
        let second = repo.add(&new_order(user_id, car_id, None)).await.unwrap();

        let history = repo.find_by_user(user_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, second);
        assert_eq!(history[1].id, first);
        assert_eq!(history[0].make, "Porsche");
    }

    #[tokio::test]
    async fn update_replaces_fields_and_options() {
        let pool = test_pool().await;
        let (user_id, car_id) = seed_user_and_car(&pool).await;
        let repo = OrderRepository::new(&pool);

        let options = ConfigurationOptions {
            id: None,
            color: Some("Midnight Blue".to_owned()),
            transmission: None,
            fuel_type: None,
        };
        let id = repo
            .add(&new_order(user_id, car_id, Some(options)))
            .await
            .unwrap();

        let mut replacement = new_order(user_id, car_id, None);
        replacement.price = Decimal::new(3_000_000, 0);
        repo.update(id, &replacement).await.unwrap();

        let stored = repo.get_by_id(id).await.unwrap().expect("order exists");
        assert_eq!(stored.price, Decimal::new(3_000_000, 0));
        assert!(stored.options.is_none());
    }

    #[tokio::test]
    async fn delete_removes_order_and_options() {
        let pool = test_pool().await;
        let (user_id, car_id) = seed_user_and_car(&pool).await;
        let repo = OrderRepository::new(&pool);

        let options = ConfigurationOptions {
            id: None,
            color: Some("Red".to_owned()),
            transmission: None,
            fuel_type: None,
        };
        let id = repo
            .add(&new_order(user_id, car_id, Some(options)))
            .await
            .unwrap();

        repo.delete(id).await.unwrap();

        assert!(repo.get_all().await.unwrap().is_empty());
        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM configuration_options")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn update_or_delete_missing_order_is_not_found() {
        let pool = test_pool().await;
        let (user_id, car_id) = seed_user_and_car(&pool).await;
        let repo = OrderRepository::new(&pool);

        assert!(matches!(
            repo.update(OrderId::from(404), &new_order(user_id, car_id, None))
                .await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.delete(OrderId::from(404)).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn missing_order_is_absent() {
        let pool = test_pool().await;
        let repo = OrderRepository::new(&pool);

        assert!(repo.get_by_id(OrderId::from(1)).await.unwrap().is_none());
    }
}
