//! Domain models for the storefront.

pub mod car;
pub mod card;
pub mod forms;
pub mod order;
pub mod user;

pub use car::{Car, CarDetail, CarImage, CarInfo, NewCar};
pub use card::{Card, NewCard};
pub use forms::{
    CardForm, CheckoutForm, ConfiguratorForm, LoginForm, NewPasswordForm, PasswordForgotForm,
    SignUpForm, VerificationForm,
};
pub use order::{ConfigurationOptions, NewOrder, Order, OrderSummary};
pub use user::{NewUser, User};
