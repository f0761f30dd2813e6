use aerobook_core::notification::{MailError, Mailer, OutboundEmail};
use aerobook_shared::redact_email;
use async_trait::async_trait;
use tracing::info;

/// Mail collaborator for environments without an SMTP relay: records the
/// message in the log stream and reports success.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        if self.from.is_empty() {
            return Err(MailError::NotConfigured("mail.from is empty".to_string()));
        }
        info!(
            from = %self.from,
            to = %redact_email(&email.recipient),
            subject = %email.subject,
            bytes = email.html_body.len(),
            "Confirmation e-mail handed off"
        );
        Ok(())
    }
}
