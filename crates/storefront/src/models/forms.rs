//! Request payloads accepted by the HTTP surface.

use serde::Deserialize;

/// Signup request.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// The four digit inputs of a verification code form.
///
/// Each slot is submitted separately; all four must be filled before the
/// code is compared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationForm {
    #[serde(default)]
    pub digit1: Option<String>,
    #[serde(default)]
    pub digit2: Option<String>,
    #[serde(default)]
    pub digit3: Option<String>,
    #[serde(default)]
    pub digit4: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Password reset initiation.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordForgotForm {
    pub email: String,
}

/// New password submission after a verified reset.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPasswordForm {
    pub password: String,
    pub confirm_password: String,
}

/// Payment card submission.
#[derive(Debug, Clone, Deserialize)]
pub struct CardForm {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cvv: String,
}

/// Configurator choices; any subset may be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfiguratorForm {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
}

/// Checkout request identifying the car to purchase.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl VerificationForm {
    /// Join the digit slots into a code string, if all four are filled.
    #[must_use]
    pub fn digits(&self) -> Option<String> {
        let slots = [&self.digit1, &self.digit2, &self.digit3, &self.digit4];
        if slots
            .iter()
            .any(|slot| slot.as_deref().is_none_or(str::is_empty))
        {
            return None;
        }
        Some(slots.into_iter().flatten().cloned().collect())
    }
}
