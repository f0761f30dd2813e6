use async_trait::async_trait;
use serde::Serialize;

/// Rendered message handed to the mail collaborator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OutboundEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum MailError {
    #[error("Mail transport not configured: {0}")]
    NotConfigured(String),
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Transport for confirmation e-mails. Delivery success never affects the booking.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError>;
}
