//! Catalog repository: cars with their detail and images.

use autohaus_core::CarId;
use sqlx::{Row, SqlitePool};

use crate::db::{RepositoryError, parse_price};
use crate::models::{Car, CarDetail, CarImage, CarInfo, NewCar};

/// Repository for catalog data.
pub struct CarRepository<'a> {
    pool: &'a SqlitePool,
}

#[derive(sqlx::FromRow)]
struct CarRow {
    id: i32,
    make: String,
    model: String,
    year: i32,
    price: String,
    description: String,
    color: String,
    transmission: String,
    fuel_type: String,
}

impl<'a> CarRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a car with its detail and images in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure.
    pub async fn add(&self, car: &NewCar) -> Result<CarId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO cars (make, model, year, price, description)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(car.price.to_string())
        .bind(&car.description)
        .fetch_one(&mut *tx)
        .await?;
        let car_id: i32 = row.try_get("id")?;

        sqlx::query(
            "INSERT INTO car_detail (car_id, color, transmission, fuel_type)
             VALUES (?, ?, ?, ?)",
        )
        .bind(car_id)
        .bind(&car.detail.color)
        .bind(&car.detail.transmission)
        .bind(&car.detail.fuel_type)
        .execute(&mut *tx)
        .await?;

        for url in &car.image_urls {
            sqlx::query("INSERT INTO car_image (car_id, url) VALUES (?, ?)")
                .bind(car_id)
                .bind(url)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(CarId::from(car_id))
    }

    /// Fetch the whole catalog with details and images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_all(&self) -> Result<Vec<Car>, RepositoryError> {
        let rows: Vec<CarRow> = sqlx::query_as(
            "SELECT c.id, c.make, c.model, c.year, c.price, c.description,
                    d.color, d.transmission, d.fuel_type
             FROM cars c
             JOIN car_detail d ON d.car_id = c.id
             ORDER BY c.id",
        )
        .fetch_all(self.pool)
        .await?;

        let mut cars = Vec::with_capacity(rows.len());
        for row in rows {
            cars.push(self.hydrate(row).await?);
        }
        Ok(cars)
    }

    /// Fetch a single car by id. Absent cars are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_id(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        let row: Option<CarRow> = sqlx::query_as(
            "SELECT c.id, c.make, c.model, c.year, c.price, c.description,
                    d.color, d.transmission, d.fuel_type
             FROM cars c
             JOIN car_detail d ON d.car_id = c.id
             WHERE c.id = ?",
        )
        .bind(i32::from(id))
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Fetch a car by its make/model/year triple. Absent cars are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_info(&self, info: &CarInfo) -> Result<Option<Car>, RepositoryError> {
        let row: Option<CarRow> = sqlx::query_as(
            "SELECT c.id, c.make, c.model, c.year, c.price, c.description,
                    d.color, d.transmission, d.fuel_type
             FROM cars c
             JOIN car_detail d ON d.car_id = c.id
             WHERE c.make = ? AND c.model = ? AND c.year = ?",
        )
        .bind(&info.make)
        .bind(&info.model)
        .bind(info.year)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Update a car's base attributes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no car has this id.
    pub async fn update(&self, id: CarId, car: &NewCar) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE cars SET make = ?, model = ?, year = ?, price = ?, description = ?
             WHERE id = ?",
        )
        .bind(&car.make)
        .bind(&car.model)
        .bind(car.year)
        .bind(car.price.to_string())
        .bind(&car.description)
        .bind(i32::from(id))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "UPDATE car_detail SET color = ?, transmission = ?, fuel_type = ?
             WHERE car_id = ?",
        )
        .bind(&car.detail.color)
        .bind(&car.detail.transmission)
        .bind(&car.detail.fuel_type)
        .bind(i32::from(id))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a car; detail and images cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no car has this id.
    pub async fn delete(&self, id: CarId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(i32::from(id))
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn hydrate(&self, row: CarRow) -> Result<Car, RepositoryError> {
        let urls: Vec<(String,)> =
            sqlx::query_as("SELECT url FROM car_image WHERE car_id = ? ORDER BY id")
                .bind(row.id)
                .fetch_all(self.pool)
                .await?;

        Ok(Car {
            id: CarId::from(row.id),
            make: row.make,
            model: row.model,
            year: row.year,
            price: parse_price(&row.price)?,
            description: row.description,
            detail: CarDetail {
                color: row.color,
                transmission: row.transmission,
                fuel_type: row.fuel_type,
            },
            images: urls
                .into_iter()
                .map(|(url,)| CarImage { url })
                .collect(),
        })
    }
}
