//! Order models.

use autohaus_core::{CarId, OrderId, OptionsId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A placed order with its price snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub car_id: CarId,
    pub user_id: UserId,
    pub price: Decimal,
    pub order_date: DateTime<Utc>,
    pub options: Option<ConfigurationOptions>,
}

/// Configurator choices attached to an order.
///
/// Any subset of the three fields may be chosen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationOptions {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<OptionsId>,
    pub color: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
}

/// Payload for placing an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub car_id: CarId,
    pub user_id: UserId,
    pub price: Decimal,
    pub order_date: DateTime<Utc>,
    pub options: Option<ConfigurationOptions>,
}

/// An order joined with the car it was placed for, as shown in history.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderSummary {
    pub id: OrderId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub transmission: String,
    pub fuel_type: String,
    pub price: Decimal,
    pub order_date: DateTime<Utc>,
    pub options: Option<ConfigurationOptions>,
}

impl ConfigurationOptions {
    /// Whether no choice was made at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.color.is_none() && self.transmission.is_none() && self.fuel_type.is_none()
    }
}
