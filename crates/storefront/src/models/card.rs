//! Payment card models.
//!
//! In memory these hold plaintext fields; every field is encrypted before it
//! reaches the database and decrypted on read.

use autohaus_core::UserId;
use serde::{Deserialize, Serialize};

/// A stored payment card, decrypted.
///
/// Each user has at most one card; `user_id` is the primary key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub user_id: UserId,
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cvv: String,
}

/// Card details submitted by a user, before the owner is attached.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NewCard {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub cvv: String,
}

impl NewCard {
    /// Attach an owner to produce a storable card.
    #[must_use]
    pub fn for_user(self, user_id: UserId) -> Card {
        Card {
            user_id,
            card_number: self.card_number,
            cardholder_name: self.cardholder_name,
            expiration_month: self.expiration_month,
            expiration_year: self.expiration_year,
            cvv: self.cvv,
        }
    }
}
