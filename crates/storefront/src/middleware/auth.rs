//! Authentication extractors over the request session.

use autohaus_core::UserId;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

/// Session keys used across the storefront.
pub mod session_keys {
    /// The logged-in user's id.
    pub const CURRENT_USER: &str = "current_user";
    /// Token of the pending signup verification flow.
    pub const VERIFICATION_TOKEN: &str = "verification_token";
    /// Token of the pending password reset flow.
    pub const RESET_TOKEN: &str = "reset_token";
    /// Id of the user whose reset code was confirmed.
    pub const RESET_USER: &str = "reset_user";
    /// Configurator choices staged before checkout.
    pub const CONFIGURATOR_CHOICE: &str = "configurator_choice";
}

/// Extractor that requires a logged-in user.
///
/// Rejects with `401` and a JSON error body when nobody is logged in.
pub struct RequireAuth(pub UserId);

/// Rejection for [`RequireAuth`].
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "errors": ["Authentication required"] })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The session is placed in extensions by SessionManagerLayer.
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection)?;

        let user_id: UserId = session
            .get(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection)?;

        Ok(Self(user_id))
    }
}

/// Extractor that optionally resolves the logged-in user.
///
/// Unlike [`RequireAuth`], this never rejects the request.
pub struct OptionalAuth(pub Option<UserId>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<UserId>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user_id))
    }
}

/// Store the logged-in user in the session.
///
/// # Errors
///
/// Returns a session error if the store is unavailable.
pub async fn set_current_user(
    session: &Session,
    user_id: UserId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user_id).await
}

/// Clear the logged-in user from the session.
///
/// # Errors
///
/// Returns a session error if the store is unavailable.
pub async fn clear_current_user(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<UserId>(session_keys::CURRENT_USER)
        .await
        .map(|_| ())
}
