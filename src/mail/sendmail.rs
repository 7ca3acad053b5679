use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::json;
use thiserror::Error;

use crate::config::Config;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Resend API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("SMTP error: {0}")]
    Smtp(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

fn check_recipient(to: &str) -> Result<(), MailError> {
    if to.trim().is_empty() || !to.contains('@') {
        return Err(MailError::InvalidAddress(to.to_string()));
    }
    Ok(())
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        check_recipient(&message.to)?;

        let response = self
            .client
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": message.to,
                "subject": message.subject,
                "html": message.html,
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Email sent to {} via Resend", message.to);
            return Ok(());
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "No response body".to_string());

        Err(MailError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(host: &str, username: &str, password: &str, from: &str) -> Result<Self, MailError> {
        let from = from
            .parse::<Mailbox>()
            .map_err(|_| MailError::InvalidAddress(from.to_string()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| MailError::Smtp(e.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        check_recipient(&message.to)?;

        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|_| MailError::InvalidAddress(message.to.clone()))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;

        tracing::info!("Email sent to {} via SMTP", message.to);
        Ok(())
    }
}

/// Used when no transport is configured, so local setups still see what
/// would have been sent.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        check_recipient(&message.to)?;
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "No mail transport configured, email not delivered"
        );
        Ok(())
    }
}

/// Resend wins over SMTP when both are configured.
pub fn build_mailer(config: &Config) -> Arc<dyn Mailer> {
    if let Some(api_key) = &config.resend_api_key {
        tracing::info!("Using Resend mail transport");
        return Arc::new(ResendMailer::new(api_key.clone(), config.from_email.clone()));
    }

    if let Some(host) = &config.smtp_host {
        match SmtpMailer::new(
            host,
            &config.smtp_username,
            &config.smtp_password,
            &config.from_email,
        ) {
            Ok(mailer) => {
                tracing::info!("Using SMTP mail transport via {}", host);
                return Arc::new(mailer);
            }
            Err(e) => tracing::error!("SMTP transport unavailable: {}", e),
        }
    }

    tracing::warn!("No mail transport configured; emails will only be logged");
    Arc::new(LogMailer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: to.to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn log_mailer_accepts_valid_recipients() {
        assert!(LogMailer.send(&message("buyer@example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn recipients_without_at_sign_are_rejected() {
        assert!(matches!(
            LogMailer.send(&message("buyer.example.com")).await,
            Err(MailError::InvalidAddress(_))
        ));
        assert!(matches!(
            LogMailer.send(&message("  ")).await,
            Err(MailError::InvalidAddress(_))
        ));
    }

    #[test]
    fn smtp_mailer_rejects_a_bad_sender() {
        assert!(matches!(
            SmtpMailer::new("smtp.example.com", "u", "p", "not a mailbox"),
            Err(MailError::InvalidAddress(_))
        ));
    }
}
