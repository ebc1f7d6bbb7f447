//! Session identity abstraction.
//!
//! Services that need to know who is acting take an [`IdRetriever`] rather
//! than reading the session directly, so they can be driven from handlers
//! and from tests alike.

use autohaus_core::UserId;

/// Supplies the id of the currently logged-in user.
pub trait IdRetriever: Send + Sync {
    /// The current user's id, or [`UserId::ANONYMOUS`] when nobody is
    /// logged in.
    fn logged_in_user_id(&self) -> UserId;
}

/// Identity resolved from the request session.
#[derive(Debug, Clone, Copy)]
pub struct SessionIdentity(pub Option<UserId>);

impl IdRetriever for SessionIdentity {
    fn logged_in_user_id(&self) -> UserId {
        self.0.unwrap_or(UserId::ANONYMOUS)
    }
}

/// Fixed identity for tests and batch tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity(pub UserId);

impl IdRetriever for FixedIdentity {
    fn logged_in_user_id(&self) -> UserId {
        self.0
    }
}
