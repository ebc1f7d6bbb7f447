//! Stored payment card handlers. All require a logged-in user.

use axum::Json;
use axum::extract::State;
use axum::response::Response;
use serde_json::json;

use axum::http::StatusCode;

use crate::error::AppError;
use crate::mappers::CardDto;
use crate::middleware::RequireAuth;
use crate::models::{CardForm, NewCard};
use crate::routes::{failure, success, success_empty};
use crate::services::{CardService, SessionIdentity};
use crate::state::AppState;

/// `GET /card` - the current user's card, decrypted.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Response, AppError> {
    let identity = SessionIdentity(Some(user_id));
    let card = CardService::new(state.pool(), &identity)
        .get_card()
        .await?;
    match card {
        Some(card) => Ok(success(CardDto::from(card))),
        None => Ok(failure(
            StatusCode::NOT_FOUND,
            vec!["No stored card".to_owned()],
        )),
    }
}

/// `POST /card` - save the current user's card, replacing any existing one.
pub async fn save(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    Json(form): Json<CardForm>,
) -> Result<Response, AppError> {
    let errors = validate_card_form(&form);
    if !errors.is_empty() {
        return Ok(failure(StatusCode::UNPROCESSABLE_ENTITY, errors));
    }

    let identity = SessionIdentity(Some(user_id));
    CardService::new(state.pool(), &identity)
        .save_card(NewCard {
            card_number: form.card_number,
            cardholder_name: form.cardholder_name,
            expiration_month: form.expiration_month,
            expiration_year: form.expiration_year,
            cvv: form.cvv,
        })
        .await?;
    Ok(success_empty())
}

/// `DELETE /card` - delete the current user's card. A no-op when none is
/// stored.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Response, AppError> {
    let identity = SessionIdentity(Some(user_id));
    CardService::new(state.pool(), &identity)
        .delete_card()
        .await?;
    Ok(success_empty())
}

/// Validate a submitted card: 16-digit number, 3-4 digit CVV, and an
/// expiration that is not in the past.
fn validate_card_form(form: &CardForm) -> Vec<String> {
    use chrono::{Datelike, Utc};

    let mut errors = Vec::new();

    if form.card_number.len() != 16 || !form.card_number.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Card number must be 16 digits".to_owned());
    }
    if form.cardholder_name.trim().is_empty() {
        errors.push("Cardholder name is required".to_owned());
    }
    if !(3..=4).contains(&form.cvv.len()) || !form.cvv.chars().all(|c| c.is_ascii_digit()) {
        errors.push("CVV must be 3 or 4 digits".to_owned());
    }

    let month = form.expiration_month.parse::<u32>().ok();
    let year = form.expiration_year.parse::<i32>().ok();
    match month {
        Some(1..=12) => {}
        _ => errors.push("Expiration month must be between 01 and 12".to_owned()),
    }
    match (month, year) {
        (Some(month @ 1..=12), Some(year)) => {
            let now = Utc::now();
            // Two-digit years are relative to the current century.
            let full_year = if year < 100 { 2000 + year } else { year };
            if full_year < now.year()
                || (full_year == now.year() && month < now.month())
            {
                errors.push("Card has expired".to_owned());
            }
        }
        (_, None) => errors.push("Expiration year must be a number".to_owned()),
        _ => {}
    }

    errors
}

/// `GET /card/exists` - whether the current user has a stored card.
pub async fn exists(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Response, AppError> {
    let identity = SessionIdentity(Some(user_id));
    let has_card = CardService::new(state.pool(), &identity)
        .has_card()
        .await?;
    Ok(success(json!({ "exists": has_card })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> CardForm {
        CardForm {
            card_number: "4111111111111111".to_owned(),
            cardholder_name: "ANNA SCHMIDT".to_owned(),
            expiration_month: "09".to_owned(),
            expiration_year: "99".to_owned(),
            cvv: "123".to_owned(),
        }
    }

    #[test]
    fn valid_card_passes() {
        assert!(validate_card_form(&valid_form()).is_empty());
    }

    #[test]
    fn short_card_number_is_rejected() {
        let mut form = valid_form();
        form.card_number = "4111".to_owned();
        assert!(!validate_card_form(&form).is_empty());
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        let mut form = valid_form();
        form.expiration_month = "13".to_owned();
        assert!(validate_card_form(&form)
            .iter()
            .any(|e| e.contains("month")));
    }

    #[test]
    fn past_year_is_rejected() {
        let mut form = valid_form();
        form.expiration_year = "20".to_owned();
        assert!(validate_card_form(&form).iter().any(|e| e.contains("expired")));
    }

    #[test]
    fn alphabetic_cvv_is_rejected() {
        let mut form = valid_form();
        form.cvv = "12a".to_owned();
        assert!(validate_card_form(&form).iter().any(|e| e.contains("CVV")));
    }
}
