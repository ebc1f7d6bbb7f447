//! Response shapes for the JSON API.
//!
//! Flattens the domain aggregates into the wire form handlers return.

use autohaus_core::{CarId, OrderId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Car, Card, ConfigurationOptions, OrderSummary, User};

/// A catalog entry with its detail flattened in.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CarDto {
    pub id: CarId,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub price: Decimal,
    pub description: String,
    pub color: String,
    pub transmission: String,
    pub fuel_type: String,
    pub images: Vec<String>,
}

impl From<Car> for CarDto {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            make: car.make,
            model: car.model,
            year: car.year,
            price: car.price,
            description: car.description,
            color: car.detail.color,
            transmission: car.detail.transmission,
            fuel_type: car.detail.fuel_type,
            images: car.images.into_iter().map(|image| image.url).collect(),
        }
    }
}

/// The owner's view of their stored card.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CardDto {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cvv: String,
}

impl From<Card> for CardDto {
    fn from(card: Card) -> Self {
        Self {
            card_number: card.card_number,
            cardholder_name: card.cardholder_name,
            expiration_month: card.expiration_month,
            expiration_year: card.expiration_year,
            cvv: card.cvv,
        }
    }
}

/// One row of a user's order history.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderDto {
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

impl From<OrderSummary> for OrderDto {
    fn from(order: OrderSummary) -> Self {
        Self {
            id: order.id,
            make: order.make,
            model: order.model,
            year: order.year,
            color: order.color,
            transmission: order.transmission,
            fuel_type: order.fuel_type,
            price: order.price,
            order_date: order.order_date,
            options: order.options,
        }
    }
}

/// Public account profile, without the password hash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserDto {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use autohaus_core::Email;

    use super::*;
    use crate::models::{CarDetail, CarImage};

    #[test]
    fn car_dto_flattens_detail_and_images() {
        let car = Car {
            id: CarId::new(3),
            make: "Audi".to_owned(),
            model: "Q8".to_owned(),
            year: 2021,
            price: Decimal::new(2_100_000, 0),
            description: "Sleek and spacious SUV for ultimate comfort".to_owned(),
            detail: CarDetail {
                color: "White".to_owned(),
                transmission: "Automatic".to_owned(),
                fuel_type: "Diesel".to_owned(),
            },
            images: vec![CarImage {
                url: "https://images.autohaus.example/audi-q8-1.jpg".to_owned(),
            }],
        };

        let dto = CarDto::from(car);
        assert_eq!(dto.fuel_type, "Diesel");
        assert_eq!(dto.images.len(), 1);
    }

    #[test]
    fn user_dto_omits_password_hash() {
        let user = User {
            id: UserId::new(1),
            first_name: "Anna".to_owned(),
            last_name: "Schmidt".to_owned(),
            email: Email::parse("anna@example.com").unwrap(),
            password_hash: "hash".to_owned(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(UserDto::from(user)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "anna@example.com");
    }
}
