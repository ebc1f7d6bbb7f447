//! Business logic on top of the repositories.

pub mod cars;
pub mod cards;
pub mod crypto;
pub mod email;
pub mod identity;
pub mod orders;
pub mod users;
pub mod verification;

pub use cars::{CarFilter, CarService, PriceOrder};
pub use cards::CardService;
pub use email::{CodePurpose, EmailError, EmailService};
pub use identity::{FixedIdentity, IdRetriever, SessionIdentity};
pub use orders::OrderService;
pub use users::UserService;
pub use verification::{VerificationError, VerificationIntent, VerificationStore};
