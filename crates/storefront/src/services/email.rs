//! Transactional email: verification codes and order receipts.
//!
//! Uses SMTP via lettre for delivery with Askama templates, sending both
//! plain text and HTML bodies.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::{CarInfo, User};

/// HTML template for verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.html")]
struct VerificationCodeHtml<'a> {
    first_name: &'a str,
    last_name: &'a str,
    code: &'a str,
    purpose: &'a str,
}

/// Plain text template for verification code email.
#[derive(Template)]
#[template(path = "email/verification_code.txt")]
struct VerificationCodeText<'a> {
    first_name: &'a str,
    last_name: &'a str,
    code: &'a str,
    purpose: &'a str,
}

/// HTML template for order receipt email.
#[derive(Template)]
#[template(path = "email/order_receipt.html")]
struct OrderReceiptHtml<'a> {
    user_name: &'a str,
    make: &'a str,
    model: &'a str,
    year: i32,
}

/// Plain text template for order receipt email.
#[derive(Template)]
#[template(path = "email/order_receipt.txt")]
struct OrderReceiptText<'a> {
    user_name: &'a str,
    make: &'a str,
    model: &'a str,
    year: i32,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// What a verification code is for; substituted into the email body.
#[derive(Debug, Clone, Copy)]
pub enum CodePurpose {
    SignUp,
    PasswordReset,
}

impl CodePurpose {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SignUp => "registration",
            Self::PasswordReset => "password reset",
        }
    }
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay address is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from: format!("{} <{}>", config.from_name, config.from_address),
        })
    }

    /// Send a 4-digit verification code to a prospective or existing user.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_verification_code(
        &self,
        to: &str,
        first_name: &str,
        last_name: &str,
        code: u16,
        purpose: CodePurpose,
    ) -> Result<(), EmailError> {
        let (text, html) = build_verification_bodies(first_name, last_name, code, purpose)?;

        self.send_multipart_email(to, "Your Autohaus verification code", &text, &html)
            .await
    }

    /// Send an order receipt after a successful purchase.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to render or send.
    pub async fn send_order_receipt(
        &self,
        user: &User,
        car: &CarInfo,
        order_id: autohaus_core::OrderId,
    ) -> Result<(), EmailError> {
        let (text, html) = build_order_receipt_bodies(&user.full_name(), car)?;
        let subject = format!("Car purchase #{order_id}");

        self.send_multipart_email(user.email.as_str(), &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Render the order receipt bodies (text, html).
///
/// # Errors
///
/// Returns error if a template fails to render.
pub fn build_order_receipt_bodies(
    user_name: &str,
    car: &CarInfo,
) -> Result<(String, String), EmailError> {
    let html = OrderReceiptHtml {
        user_name,
        make: &car.make,
        model: &car.model,
        year: car.year,
    }
    .render()?;
    let text = OrderReceiptText {
        user_name,
        make: &car.make,
        model: &car.model,
        year: car.year,
    }
    .render()?;
    Ok((text, html))
}

/// Render the verification code bodies (text, html).
///
/// # Errors
///
/// Returns error if a template fails to render.
pub fn build_verification_bodies(
    first_name: &str,
    last_name: &str,
    code: u16,
    purpose: CodePurpose,
) -> Result<(String, String), EmailError> {
    let code = code.to_string();
    let html = VerificationCodeHtml {
        first_name,
        last_name,
        code: &code,
        purpose: purpose.as_str(),
    }
    .render()?;
    let text = VerificationCodeText {
        first_name,
        last_name,
        code: &code,
        purpose: purpose.as_str(),
    }
    .render()?;
    Ok((text, html))
}
