//! Catalog browsing: sorting and filtering.

use autohaus_core::CarId;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::{CarRepository, RepositoryError};
use crate::models::{Car, CarInfo};

/// Direction for price sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceOrder {
    Cheap,
    /// Any order string other than `cheap` sorts expensive-first.
    #[default]
    Expensive,
}

impl PriceOrder {
    /// Parse an order string. Only `cheap` selects cheapest-first;
    /// everything else falls through to expensive-first.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == "cheap" {
            Self::Cheap
        } else {
            Self::Expensive
        }
    }
}

/// Catalog filter criteria. All present criteria must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilter {
    #[serde(default)]
    pub min_price: Option<Decimal>,
    #[serde(default)]
    pub max_price: Option<Decimal>,
    #[serde(default)]
    pub min_year: Option<i32>,
    #[serde(default)]
    pub max_year: Option<i32>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
}

/// Catalog read operations.
pub struct CarService<'a> {
    cars: CarRepository<'a>,
}

impl<'a> CarService<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            cars: CarRepository::new(pool),
        }
    }

    /// The whole catalog in storage order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_all(&self) -> Result<Vec<Car>, RepositoryError> {
        self.cars.get_all().await
    }

    /// A single car by id. Absent cars are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_id(&self, id: CarId) -> Result<Option<Car>, RepositoryError> {
        self.cars.get_by_id(id).await
    }

    /// A single car by its make/model/year triple. Absent cars are
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` on query failure or corrupt stored data.
    pub async fn get_by_info(&self, info: &CarInfo) -> Result<Option<Car>, RepositoryError> {
        self.cars.get_by_info(info).await
    }

    /// Sort alphabetically by the make and model joined into one label.
    /// Stable.
    ///
    /// The label is compared as a single string, so a make that is a
    /// prefix of another interleaves with it rather than grouping first.
    pub fn sort_by_alphabet(cars: &mut [Car]) {
        cars.sort_by_cached_key(|car| format!("{}{}", car.make, car.model));
    }

    /// Sort newest model year first. Stable.
    pub fn sort_by_novelty(cars: &mut [Car]) {
        cars.sort_by(|a, b| b.year.cmp(&a.year));
    }

    /// Sort by price in the given direction. Stable.
    pub fn sort_by_price(cars: &mut [Car], order: PriceOrder) {
        match order {
            PriceOrder::Cheap => cars.sort_by(|a, b| a.price.cmp(&b.price)),
            PriceOrder::Expensive => cars.sort_by(|a, b| b.price.cmp(&a.price)),
        }
    }

    /// Keep only cars matching every present criterion.
    pub fn filter(cars: &mut Vec<Car>, filter: &CarFilter) {
        cars.retain(|car| {
            filter.min_price.is_none_or(|min| car.price >= min)
                && filter.max_price.is_none_or(|max| car.price <= max)
                && filter.min_year.is_none_or(|min| car.year >= min)
                && filter.max_year.is_none_or(|max| car.year <= max)
                && filter
                    .fuel_type
                    .as_deref()
                    .is_none_or(|fuel| car.detail.fuel_type == fuel)
                && filter
                    .transmission
                    .as_deref()
                    .is_none_or(|t| car.detail.transmission == t)
                && filter.make.as_deref().is_none_or(|make| car.make == make)
        });
    }
}
