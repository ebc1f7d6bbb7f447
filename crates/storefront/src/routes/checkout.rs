//! Configurator and checkout handlers. All require a logged-in user.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use tower_sessions::Session;
use tracing::info;

use crate::error::AppError;
use crate::mappers::OrderDto;
use crate::middleware::RequireAuth;
use crate::middleware::auth::session_keys;
use crate::models::{CarInfo, CheckoutForm, ConfigurationOptions, ConfiguratorForm};
use crate::routes::{failure, success, success_empty};
use crate::services::{CarService, CardService, OrderService, SessionIdentity, UserService};
use crate::state::AppState;

/// `POST /configurator` - stage configurator choices in the session until
/// checkout.
pub async fn configurator(
    RequireAuth(_user_id): RequireAuth,
    session: Session,
    Json(form): Json<ConfiguratorForm>,
) -> Result<Response, AppError> {
    let choice = ConfigurationOptions {
        id: None,
        color: form.color,
        transmission: form.transmission,
        fuel_type: form.fuel_type,
    };
    session
        .insert(session_keys::CONFIGURATOR_CHOICE, choice)
        .await?;
    Ok(success_empty())
}

/// `DELETE /configurator` - discard staged choices.
pub async fn clear_configurator(
    RequireAuth(_user_id): RequireAuth,
    session: Session,
) -> Result<Response, AppError> {
    session
        .remove::<ConfigurationOptions>(session_keys::CONFIGURATOR_CHOICE)
        .await?;
    Ok(success_empty())
}

/// `POST /checkout` - place an order for the identified car.
///
/// Requires a stored card. Consumes any staged configurator choices, emails
/// a receipt, and returns the order id. The order is committed before the
/// receipt is sent, so a mail failure surfaces as an error but does not
/// undo the purchase.
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<Response, AppError> {
    let identity = SessionIdentity(Some(user_id));

    let has_card = CardService::new(state.pool(), &identity)
        .has_card()
        .await?;
    if !has_card {
        return Ok(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            vec!["A payment card is required before checkout".to_owned()],
        ));
    }

    let info = CarInfo {
        make: form.make,
        model: form.model,
        year: form.year,
    };
    let Some(car) = CarService::new(state.pool()).get_by_info(&info).await? else {
        return Ok(failure(
            StatusCode::NOT_FOUND,
            vec!["No such car in the catalog".to_owned()],
        ));
    };

    let options = session
        .remove::<ConfigurationOptions>(session_keys::CONFIGURATOR_CHOICE)
        .await?
        .filter(|choice| !choice.is_empty());

    let orders = OrderService::new(state.pool(), &identity);
    let order_id = orders.add_order_logged_in(&car, options).await?;
    info!(order_id = %order_id, user_id = %user_id, "order placed");

    let user = UserService::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Internal("logged-in user no longer exists".to_owned()))?;
    state
        .email()
        .send_order_receipt(&user, &car.info(), order_id)
        .await?;

    Ok(success(json!({ "order_id": order_id })))
}

/// `GET /orders` - the current user's order history, newest first.
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user_id): RequireAuth,
) -> Result<Response, AppError> {
    let identity = SessionIdentity(Some(user_id));
    let history = OrderService::new(state.pool(), &identity)
        .order_history()
        .await?;
    let dtos: Vec<OrderDto> = history.into_iter().map(OrderDto::from).collect();
    Ok(success(dtos))
}
