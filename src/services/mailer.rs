//! Outbound email for password resets.
//!
//! Uses SMTP via lettre.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;
use crate::utils::AppError;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to_email: &str, to_name: &str, reset_url: &str) -> Result<(), AppError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let from = format!("{} <{}>", config.from_name, config.from_email)
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid sender address: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Internal(format!("Invalid SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(Self { transport, from })
    }
}

pub fn password_reset_body(to_name: &str, reset_url: &str) -> String {
    format!(
        "Hello {},\n\nYour password reset link is as follows:\n\n{}\n\n\
         If you have not requested this email, then ignore it.\n",
        to_name, reset_url
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to_email: &str, to_name: &str, reset_url: &str) -> Result<(), AppError> {
        let to = to_email
            .parse::<Mailbox>()
            .map_err(|e| AppError::Upstream(format!("Invalid recipient address: {}", e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Password Recovery")
            .header(ContentType::TEXT_PLAIN)
            .body(password_reset_body(to_name, reset_url))
            .map_err(|e| AppError::Upstream(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to send email: {}", e)))?;

        log::info!("📧 Password reset email sent to {}", to_email);
        Ok(())
    }
}
