//! Development seed data for the catalog.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::{CarRepository, RepositoryError};
use crate::models::{CarDetail, NewCar};

fn car(
    make: &str,
    model: &str,
    year: i32,
    price: i64,
    description: &str,
    color: &str,
    transmission: &str,
    fuel_type: &str,
    image_slug: &str,
) -> NewCar {
    NewCar {
        make: make.to_owned(),
        model: model.to_owned(),
        year,
        price: Decimal::new(price, 0),
        description: description.to_owned(),
        detail: CarDetail {
            color: color.to_owned(),
            transmission: transmission.to_owned(),
            fuel_type: fuel_type.to_owned(),
        },
        image_urls: vec![
            format!("https://images.autohaus.example/{image_slug}-1.jpg"),
            format!("https://images.autohaus.example/{image_slug}-2.jpg"),
        ],
    }
}

fn catalog() -> Vec<NewCar> {
    vec![
        car(
            "Volkswagen",
            "Arteon",
            2022,
            1_260_000,
            "Luxurious sedan with advanced features",
            "Black",
            "Automatic",
            "Gasoline",
            "volkswagen-arteon",
        ),
        car(
            "Porsche",
            "Taycan",
            2023,
            3_360_000,
            "Electric sports car with spectacular performance",
            "White",
            "Automatic",
            "Electric",
            "porsche-taycan",
        ),
        car(
            "Audi",
            "Q8",
            2021,
            2_100_000,
            "Sleek and spacious SUV for ultimate comfort",
            "White",
            "Automatic",
            "Diesel",
            "audi-q8",
        ),
        car(
            "Volkswagen",
            "Golf",
            2022,
            784_000,
            "Versatile hatchback with high fuel efficiency",
            "Blue",
            "Manual",
            "Gasoline",
            "volkswagen-golf",
        ),
        car(
            "Lamborghini",
            "Huracan",
            2023,
            8_400_000,
            "Incredible supercar with iconic design",
            "Red",
            "Automatic",
            "Gasoline",
            "lamborghini-huracan",
        ),
        car(
            "Audi",
            "A4",
            2022,
            1_120_000,
            "Elegant and sporty sedan for daily drives",
            "Gray",
            "Automatic",
            "Gasoline",
            "audi-a4",
        ),
        car(
            "Lamborghini",
            "Aventador",
            2023,
            14_000_000,
            "Legendary hypercar with breathtaking performance",
            "Yellow",
            "Automatic",
            "Gasoline",
            "lamborghini-aventador",
        ),
    ]
}

/// Seed the catalog. Skips seeding when cars already exist.
///
/// # Errors
///
/// Returns `RepositoryError` on query failure.
pub async fn seed_catalog(pool: &SqlitePool) -> Result<(), RepositoryError> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cars")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        info!(existing, "catalog already seeded, skipping");
        return Ok(());
    }

    let repo = CarRepository::new(pool);
    let cars = catalog();
    let count = cars.len();
    for new_car in &cars {
        repo.add(new_car).await?;
    }
    info!(count, "seeded catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let pool = test_pool().await;

        seed_catalog(&pool).await.unwrap();
        seed_catalog(&pool).await.unwrap();

        let cars = CarRepository::new(&pool).get_all().await.unwrap();
        assert_eq!(cars.len(), 7);
    }

    #[tokio::test]
    async fn seeded_cars_have_details_and_images() {
        let pool = test_pool().await;
        seed_catalog(&pool).await.unwrap();

        let cars = CarRepository::new(&pool).get_all().await.unwrap();
        let taycan = cars
            .iter()
            .find(|c| c.model == "Taycan")
            .expect("Taycan in seed data");
        assert_eq!(taycan.detail.fuel_type, "Electric");
        assert_eq!(taycan.images.len(), 2);
    }
}
