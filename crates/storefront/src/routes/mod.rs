//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//!
//! # Catalog
//! GET  /cars                        - Catalog with sort/filter query params
//! GET  /cars/{id}                   - Single car
//!
//! # Auth
//! POST /auth/signup                 - Start signup, emails a code
//! POST /auth/signup/verify          - Confirm code, creates the account
//! POST /auth/signup/resend          - Re-email a fresh code
//! POST /auth/login                  - Login
//! POST /auth/logout                 - Logout
//! GET  /auth/me                     - Current user profile (null for guests)
//! POST /auth/password/forgot        - Start password reset, emails a code
//! POST /auth/password/verify        - Confirm reset code
//! POST /auth/password/change        - Set new password after confirmation
//!
//! # Cards (requires auth)
//! GET    /card                      - Stored card
//! POST   /card                      - Save card (replaces existing)
//! DELETE /card                      - Delete card
//! GET    /card/exists               - Whether a card is stored
//!
//! # Checkout (requires auth)
//! POST   /configurator              - Stage configurator choices
//! DELETE /configurator              - Discard staged choices
//! POST /checkout                    - Place order, emails a receipt
//! GET  /orders                      - Order history
//! ```

pub mod auth;
pub mod cards;
pub mod catalog;
pub mod checkout;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::json;

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/signup/verify", post(auth::signup_verify))
        .route("/signup/resend", post(auth::signup_resend))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password/forgot", post(auth::password_forgot))
        .route("/password/verify", post(auth::password_verify))
        .route("/password/change", post(auth::password_change))
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/{id}", get(catalog::show))
}

/// Create the card routes router.
pub fn card_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cards::show).post(cards::save).delete(cards::remove),
        )
        .route("/exists", get(cards::exists))
}

/// Create all routes for the storefront.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/cars", catalog_routes())
        .nest("/auth", auth_routes())
        .nest("/card", card_routes())
        .route(
            "/configurator",
            post(checkout::configurator).delete(checkout::clear_configurator),
        )
        .route("/checkout", post(checkout::checkout))
        .route("/orders", get(checkout::orders))
}

async fn health() -> &'static str {
    "ok"
}

/// A `{"success": true, ...}` JSON response.
pub(crate) fn success<T: Serialize>(data: T) -> Response {
    Json(json!({ "success": true, "data": data })).into_response()
}

/// A bare `{"success": true}` JSON response.
pub(crate) fn success_empty() -> Response {
    Json(json!({ "success": true })).into_response()
}

/// A `{"success": false, "errors": [...]}` JSON response.
pub(crate) fn failure(status: StatusCode, errors: Vec<String>) -> Response {
    (status, Json(json!({ "success": false, "errors": errors }))).into_response()
}
