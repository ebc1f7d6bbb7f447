//! Signup, login and password reset handlers.
//!
//! Signup and password reset are two-step flows: the first request emails a
//! 4-digit code and stashes a flow token in the session; the verify request
//! checks the submitted code against the pending flow.

use autohaus_core::{Email, UserId};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::json;
use tower_sessions::Session;
use tracing::info;

use crate::error::AppError;
use crate::mappers::UserDto;
use crate::middleware::OptionalAuth;
use crate::middleware::auth::{clear_current_user, session_keys, set_current_user};
use crate::models::{
    LoginForm, NewPasswordForm, NewUser, PasswordForgotForm, SignUpForm, VerificationForm,
};
use crate::routes::{failure, success, success_empty};
use crate::services::{
    CodePurpose, SessionIdentity, UserService, VerificationError, VerificationIntent,
};
use crate::state::AppState;

/// `POST /auth/signup` - validate the form and email a verification code.
///
/// The account is not created until the code is confirmed.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<SignUpForm>,
) -> Result<Response, AppError> {
    let mut errors = Vec::new();
    if form.first_name.trim().is_empty() {
        errors.push("First name is required".to_owned());
    }
    if form.last_name.trim().is_empty() {
        errors.push("Last name is required".to_owned());
    }
    let email = match Email::parse(&form.email) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(format!("Invalid email: {e}"));
            None
        }
    };
    if form.password.is_empty() {
        errors.push("Password is required".to_owned());
    }
    if form.password != form.confirm_password {
        errors.push("Passwords do not match".to_owned());
    }
    if !errors.is_empty() {
        return Ok(failure(StatusCode::UNPROCESSABLE_ENTITY, errors));
    }
    let Some(email) = email else {
        return Ok(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            vec!["Invalid email".to_owned()],
        ));
    };

    let users = UserService::new(state.pool());
    if users.email_exists(&email).await? {
        return Ok(failure(
            StatusCode::CONFLICT,
            vec!["An account with this email already exists".to_owned()],
        ));
    }

    let new_user = NewUser {
        first_name: form.first_name,
        last_name: form.last_name,
        email,
        password: form.password,
    };
    let (token, code) = state
        .verifications()
        .begin(VerificationIntent::SignUp(new_user.clone()));
    session
        .insert(session_keys::VERIFICATION_TOKEN, token)
        .await?;

    state
        .email()
        .send_verification_code(
            new_user.email.as_str(),
            &new_user.first_name,
            &new_user.last_name,
            code,
            CodePurpose::SignUp,
        )
        .await?;

    info!(email = %new_user.email, "signup verification code sent");
    Ok(success_empty())
}

/// `POST /auth/signup/verify` - confirm the code and create the account.
pub async fn signup_verify(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<VerificationForm>,
) -> Result<Response, AppError> {
    let Some(token) = session
        .get::<String>(session_keys::VERIFICATION_TOKEN)
        .await?
    else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["No pending signup verification".to_owned()],
        ));
    };

    let intent = match state.verifications().verify(&token, &form) {
        Ok(intent) => intent,
        Err(err) => return Ok(verification_failure(&err)),
    };
    let VerificationIntent::SignUp(new_user) = intent else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["No pending signup verification".to_owned()],
        ));
    };

    let users = UserService::new(state.pool());
    let user_id = users.register(&new_user).await?;
    session
        .remove::<String>(session_keys::VERIFICATION_TOKEN)
        .await?;
    set_current_user(&session, user_id).await?;

    info!(user_id = %user_id, "account created");
    Ok(success(json!({ "user_id": user_id })))
}

/// `POST /auth/signup/resend` - regenerate the code and email it again.
pub async fn signup_resend(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let Some(token) = session
        .get::<String>(session_keys::VERIFICATION_TOKEN)
        .await?
    else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["No pending signup verification".to_owned()],
        ));
    };

    let (code, intent) = match state.verifications().resend(&token) {
        Ok(resent) => resent,
        Err(err) => return Ok(verification_failure(&err)),
    };
    let VerificationIntent::SignUp(new_user) = intent else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["No pending signup verification".to_owned()],
        ));
    };

    state
        .email()
        .send_verification_code(
            new_user.email.as_str(),
            &new_user.first_name,
            &new_user.last_name,
            code,
            CodePurpose::SignUp,
        )
        .await?;

    Ok(success_empty())
}

/// `POST /auth/login` - check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Response, AppError> {
    let users = UserService::new(state.pool());
    match users.validate_user(&form.email, &form.password).await? {
        Some(user) => {
            set_current_user(&session, user.id).await?;
            info!(user_id = %user.id, "user logged in");
            Ok(success(UserDto::from(user)))
        }
        None => Ok(failure(
            StatusCode::UNAUTHORIZED,
            vec!["Invalid email or password".to_owned()],
        )),
    }
}

/// `GET /auth/me` - the logged-in user's profile, or `null` for guests.
pub async fn me(
    State(state): State<AppState>,
    OptionalAuth(user_id): OptionalAuth,
) -> Result<Response, AppError> {
    let identity = SessionIdentity(user_id);
    // A session naming a deleted account behaves like a guest.
    let user = UserService::new(state.pool()).get_logged_in(&identity).await?;
    Ok(user.map_or_else(
        || success(serde_json::Value::Null),
        |user| success(UserDto::from(user)),
    ))
}

/// `POST /auth/logout` - end the session.
pub async fn logout(session: Session) -> Result<Response, AppError> {
    clear_current_user(&session).await?;
    Ok(success_empty())
}

/// `POST /auth/password/forgot` - start a reset flow for an existing account.
pub async fn password_forgot(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<PasswordForgotForm>,
) -> Result<Response, AppError> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            vec!["Invalid email".to_owned()],
        ));
    };

    let users = UserService::new(state.pool());
    let Some(user) = users.get_by_email(&email).await? else {
        return Ok(failure(
            StatusCode::NOT_FOUND,
            vec!["No account with this email".to_owned()],
        ));
    };

    let (token, code) = state
        .verifications()
        .begin(VerificationIntent::PasswordReset { user_id: user.id });
    session.insert(session_keys::RESET_TOKEN, token).await?;

    state
        .email()
        .send_verification_code(
            user.email.as_str(),
            &user.first_name,
            &user.last_name,
            code,
            CodePurpose::PasswordReset,
        )
        .await?;

    info!(user_id = %user.id, "password reset code sent");
    Ok(success_empty())
}

/// `POST /auth/password/verify` - confirm the reset code.
pub async fn password_verify(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<VerificationForm>,
) -> Result<Response, AppError> {
    let Some(token) = session.get::<String>(session_keys::RESET_TOKEN).await? else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["No pending password reset".to_owned()],
        ));
    };

    let intent = match state.verifications().verify(&token, &form) {
        Ok(intent) => intent,
        Err(err) => return Ok(verification_failure(&err)),
    };
    let VerificationIntent::PasswordReset { user_id } = intent else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["No pending password reset".to_owned()],
        ));
    };

    session.remove::<String>(session_keys::RESET_TOKEN).await?;
    session.insert(session_keys::RESET_USER, user_id).await?;
    Ok(success_empty())
}

/// `POST /auth/password/change` - set the new password after a confirmed
/// reset code.
pub async fn password_change(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<NewPasswordForm>,
) -> Result<Response, AppError> {
    let Some(user_id) = session.get::<UserId>(session_keys::RESET_USER).await? else {
        return Ok(failure(
            StatusCode::BAD_REQUEST,
            vec!["Password reset has not been verified".to_owned()],
        ));
    };

    if form.password.is_empty() {
        return Ok(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            vec!["Password is required".to_owned()],
        ));
    }
    if form.password != form.confirm_password {
        return Ok(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            vec!["Passwords do not match".to_owned()],
        ));
    }

    UserService::new(state.pool())
        .change_password(user_id, &form.password)
        .await?;
    session.remove::<UserId>(session_keys::RESET_USER).await?;

    info!(user_id = %user_id, "password changed");
    Ok(success_empty())
}

/// Map a verification failure onto the JSON error contract.
///
/// Incomplete or mismatched codes leave the flow pending so the user can
/// retry with the same token.
fn verification_failure(err: &VerificationError) -> Response {
    let status = match err {
        VerificationError::Expired => StatusCode::BAD_REQUEST,
        VerificationError::IncompleteDigits | VerificationError::Mismatch => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    failure(status, vec![err.to_string()])
}
