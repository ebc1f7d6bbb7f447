//! Catalog browsing handlers.

use autohaus_core::CarId;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;
use crate::mappers::CarDto;
use crate::routes::success;
use crate::services::{CarFilter, CarService, PriceOrder};
use crate::state::AppState;

/// How to sort the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Alphabet,
    Novelty,
    Price,
}

/// Query parameters for the catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub sort: Option<SortKey>,
    /// Price direction; only consulted when `sort=price`.
    #[serde(default)]
    pub order: Option<String>,
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

impl CatalogQuery {
    fn filter(&self) -> CarFilter {
        CarFilter {
            min_price: self.min_price,
            max_price: self.max_price,
            min_year: self.min_year,
            max_year: self.max_year,
            fuel_type: self.fuel_type.clone(),
            transmission: self.transmission.clone(),
            make: self.make.clone(),
        }
    }
}

/// `GET /cars` - the catalog, filtered then sorted.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Response, AppError> {
    let service = CarService::new(state.pool());
    let mut cars = service.get_all().await?;

    CarService::filter(&mut cars, &query.filter());

    match query.sort {
        Some(SortKey::Alphabet) => CarService::sort_by_alphabet(&mut cars),
        Some(SortKey::Novelty) => CarService::sort_by_novelty(&mut cars),
        Some(SortKey::Price) => {
            let order = query
                .order
                .as_deref()
                .map_or_else(PriceOrder::default, PriceOrder::parse);
            CarService::sort_by_price(&mut cars, order);
        }
        None => {}
    }

    let dtos: Vec<CarDto> = cars.into_iter().map(CarDto::from).collect();
    Ok(success(dtos))
}

/// `GET /cars/{id}` - a single car.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CarId>,
) -> Result<Response, AppError> {
    let car = CarService::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("car not found".to_owned()))?;
    Ok(success(CarDto::from(car)))
}
