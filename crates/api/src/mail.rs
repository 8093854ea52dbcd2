//! Confirmation-code delivery via SMTP.
//!
//! The signup flow only needs a fire-and-forget `deliver(destination, code)`
//! capability, expressed as the [`CodeDelivery`] trait. [`SmtpDelivery`]
//! wraps the `lettre` async SMTP transport; when `SMTP_HOST` is not set,
//! [`MailConfig::from_env`] returns `None` and [`LogDelivery`] is used
//! instead so local development works without a mail server.

use async_trait::async_trait;
use std::sync::Arc;

/// Error type for delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@medialog.local";

/// Configuration for the SMTP delivery channel.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | --                        |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@medialog.local`  |
    /// | `SMTP_USER`     | no       | --                        |
    /// | `SMTP_PASSWORD` | no       | --                        |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// Capability contract for sending a confirmation code to a destination
/// address. No acknowledgement is required; callers spawn the delivery and
/// move on.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    async fn deliver(&self, destination: &str, code: &str) -> Result<(), MailError>;
}

/// Sends confirmation codes over SMTP.
pub struct SmtpDelivery {
    config: MailConfig,
}

impl SmtpDelivery {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CodeDelivery for SmtpDelivery {
    async fn deliver(&self, destination: &str, code: &str) -> Result<(), MailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let body = format!(
            "Welcome to medialog.\n\n\
             Your confirmation code:\n\n{code}\n\n\
             Exchange it for an access token at POST /api/v1/auth/token."
        );

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(destination.parse()?)
            .subject("[medialog] Confirm your account")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(password)) = (&self.config.smtp_user, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        let transport = builder.build();
        transport.send(email).await?;

        tracing::debug!(destination, "Confirmation code dispatched via SMTP");
        Ok(())
    }
}

/// Dev fallback: logs the code instead of sending it anywhere.
pub struct LogDelivery;

#[async_trait]
impl CodeDelivery for LogDelivery {
    async fn deliver(&self, destination: &str, code: &str) -> Result<(), MailError> {
        tracing::info!(destination, code, "SMTP not configured; confirmation code logged");
        Ok(())
    }
}

/// Build the delivery channel from the environment: SMTP when configured,
/// log-only otherwise.
pub fn delivery_from_env() -> Arc<dyn CodeDelivery> {
    match MailConfig::from_env() {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, "Email delivery configured");
            Arc::new(SmtpDelivery::new(config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; confirmation codes will only be logged");
            Arc::new(LogDelivery)
        }
    }
}
