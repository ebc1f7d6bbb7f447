//! Catalog models: cars, their details and images.

use autohaus_core::CarId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A car listed in the catalog, with its detail and image gallery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Car {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub description: String,
    pub detail: CarDetail,
    pub images: Vec<CarImage>,
}

/// Physical characteristics of a car.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarDetail {
    pub color: String,
    pub transmission: String,
    pub fuel_type: String,
}

/// A single gallery image for a car.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarImage {
    pub url: String,
}

/// Identifying triple used to look a car up without its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarInfo {
    pub make: String,
    pub model: String,
    pub year: i32,
}

/// Payload for inserting a new car into the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCar {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub description: String,
    pub detail: CarDetail,
    pub image_urls: Vec<String>,
}

impl Car {
    /// Identifying triple for this car.
    #[must_use]
    pub fn info(&self) -> CarInfo {
        CarInfo {
            make: self.make.clone(),
            model: self.model.clone(),
            year: self.year,
        }
    }
}
