//! Notification sink
//!
//! Outbound delivery is a collaborator, not part of the circulation core:
//! every call is best-effort, failures are logged and swallowed by the
//! caller, and no item lock is ever held across a send.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::patron::Patron,
};

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A reserved item has a freed copy earmarked for the patron
    ReservationAvailable,
    /// A loan has gone past its due date
    LoanOverdue,
    /// A loan is due within the reminder window
    ReturnReminder,
}

impl NotificationKind {
    fn subject(self) -> &'static str {
        match self {
            NotificationKind::ReservationAvailable => "Your reserved book is available",
            NotificationKind::LoanOverdue => "Your loan is overdue",
            NotificationKind::ReturnReminder => "Your loan is due soon",
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(
        &self,
        kind: NotificationKind,
        recipient: &Patron,
        payload: &str,
    ) -> AppResult<()>;
}

/// Default sink: writes the notification to the log stream
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn notify(
        &self,
        kind: NotificationKind,
        recipient: &Patron,
        payload: &str,
    ) -> AppResult<()> {
        tracing::info!(
            kind = ?kind,
            patron_id = recipient.id,
            email = %recipient.email,
            "notification: {}",
            payload
        );
        Ok(())
    }
}

/// SMTP sink delivering notifications by email
pub struct SmtpSink {
    config: EmailConfig,
}

impl SmtpSink {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_mailer(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Internal(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let builder = if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            builder.credentials(Credentials::new(username.clone(), password.clone()))
        } else {
            builder
        };

        Ok(builder.build())
    }
}

#[async_trait]
impl NotificationSink for SmtpSink {
    async fn notify(
        &self,
        kind: NotificationKind,
        recipient: &Patron,
        payload: &str,
    ) -> AppResult<()> {
        let from_name = self.config.smtp_from_name.as_deref().unwrap_or("Circulate");
        let from = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?;
        let to = Mailbox::from_str(&format!(
            "{} {} <{}>",
            recipient.first_name, recipient.last_name, recipient.email
        ))
        .map_err(|e| AppError::Internal(format!("Invalid to address: {}", e)))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(kind.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(payload.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer = self.build_mailer()?;
        mailer
            .send(&email)
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
