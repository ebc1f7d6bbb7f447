//! Pending email verification flows.
//!
//! Each flow is keyed by an opaque token held in the caller's session, so
//! concurrent signups and password resets never see each other's codes.
//! Entries expire after [`CODE_TTL`].

use std::sync::Arc;
use std::time::Duration;

use autohaus_core::UserId;
use moka::sync::Cache;
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NewUser, VerificationForm};

/// How long a pending verification stays valid.
pub const CODE_TTL: Duration = Duration::from_secs(10 * 60);

const MAX_PENDING: u64 = 10_000;

/// What a successful verification unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationIntent {
    /// Create this account once the code is confirmed.
    SignUp(NewUser),
    /// Allow this user to set a new password.
    PasswordReset { user_id: UserId },
}

/// Why a verification attempt failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// No pending flow for this token; it expired or never existed.
    #[error("verification expired or not found")]
    Expired,

    /// Not all four digit slots were filled in.
    #[error("all four digits are required")]
    IncompleteDigits,

    /// The submitted code does not match. The flow stays pending.
    #[error("incorrect verification code")]
    Mismatch,
}

#[derive(Debug, Clone)]
struct Pending {
    code: u16,
    intent: VerificationIntent,
}

/// In-memory store of pending verification flows with per-entry TTL.
#[derive(Clone)]
pub struct VerificationStore {
    cache: Cache<String, Arc<Pending>>,
}

impl Default for VerificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MAX_PENDING)
                .time_to_live(CODE_TTL)
                .build(),
        }
    }

    /// Start a flow: generate a token and a 4-digit code.
    #[must_use]
    pub fn begin(&self, intent: VerificationIntent) -> (String, u16) {
        let token = Uuid::new_v4().to_string();
        let code = generate_code();
        self.cache
            .insert(token.clone(), Arc::new(Pending { code, intent }));
        (token, code)
    }

    /// Regenerate the code for a pending flow, keeping its intent.
    ///
    /// Returns the new code and a copy of the intent so the notification
    /// email can be rebuilt.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::Expired` if the flow is gone.
    pub fn resend(&self, token: &str) -> Result<(u16, VerificationIntent), VerificationError> {
        let pending = self.cache.get(token).ok_or(VerificationError::Expired)?;
        let code = generate_code();
        let intent = pending.intent.clone();
        self.cache.insert(
            token.to_owned(),
            Arc::new(Pending {
                code,
                intent: intent.clone(),
            }),
        );
        Ok((code, intent))
    }

    /// Check a submitted code against the pending flow.
    ///
    /// On success the flow is consumed and its intent returned. On any
    /// failure other than expiry the flow stays pending so the user can
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError` describing why the attempt failed.
    pub fn verify(
        &self,
        token: &str,
        form: &VerificationForm,
    ) -> Result<VerificationIntent, VerificationError> {
        let pending = self.cache.get(token).ok_or(VerificationError::Expired)?;

        // Completeness is checked before the code is ever compared.
        let digits = form.digits().ok_or(VerificationError::IncompleteDigits)?;

        if digits.parse::<u16>() != Ok(pending.code) {
            return Err(VerificationError::Mismatch);
        }

        self.cache.invalidate(token);
        Ok(pending.intent.clone())
    }

    /// Abandon a pending flow.
    pub fn cancel(&self, token: &str) {
        self.cache.invalidate(token);
    }
}

/// A random code in `1000..=9999`, so it always has exactly four digits.
fn generate_code() -> u16 {
    rand::rng().random_range(1000..=9999)
}
