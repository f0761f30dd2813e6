//! Confirmation e-mail: render, log once, hand to the mail collaborator.

use aerobook_core::notification::{Mailer, OutboundEmail};
use aerobook_core::repository::{BookingRepository, EmailLogRepository};
use aerobook_core::{Booking, BookingError, EmailLog, Passenger, PassengerType};
use aerobook_shared::redact_email;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{info, warn};

use crate::orchestrator::normalize_reference;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),
    #[error(transparent)]
    Booking(#[from] BookingError),
}

/// What happened to one send attempt. Delivery failure is reported here and
/// never changes the booking.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmailReceipt {
    pub pnr: String,
    pub recipient: String,
    pub subject: String,
    /// `None` when the attempt could not be logged.
    pub log_id: Option<i64>,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn confirmation_subject(pnr: &str) -> String {
    format!("Booking Confirmation - PNR: {}", pnr)
}

fn money(amount: Decimal, currency: &str) -> String {
    format!("{:.2} {}", amount, escape_html(currency))
}

fn type_label(passenger: &Passenger) -> &'static str {
    match passenger.passenger_type {
        PassengerType::Adult => "Adult",
        PassengerType::Child => "Child",
        PassengerType::Infant => "Infant",
    }
}

/// HTML body of the confirmation. User-supplied text is escaped.
pub fn render_confirmation(booking: &Booking) -> String {
    let greeting = match booking.passengers.lead_passenger() {
        Some(lead) => format!("Dear {}", escape_html(&lead.full_name())),
        None => "Dear Passenger".to_string(),
    };
    let (origin, destination) = booking.route();

    let mut details = String::new();
    let mut row = |label: &str, value: String| {
        let _ = write!(details, "<tr><th>{}</th><td>{}</td></tr>", label, value);
    };
    row("PNR", escape_html(&booking.pnr));
    row("Origin", escape_html(&origin));
    row("Destination", escape_html(&destination));
    row("Fare type", escape_html(&booking.fare_type));
    row("Fare price", money(booking.fare_price, &booking.currency));
    if let Some(fee) = booking.service_fee.filter(|f| !f.is_zero()) {
        row("Service fee", money(fee, &booking.service_fee_currency));
    }
    row("Total", money(booking.total_price, &booking.currency));
    row("Status", booking.status.to_string());

    let mut passengers = String::new();
    for p in booking.passengers.iter() {
        let _ = write!(
            passengers,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&p.full_name()),
            type_label(p),
            p.age.map(|a| a.to_string()).unwrap_or_default()
        );
    }

    format!(
        "<html><body>\
         <p>{greeting},</p>\
         <p>Your booking is confirmed.</p>\
         <table>{details}</table>\
         <h3>Passengers</h3>\
         <table><tr><th>Name</th><th>Type</th><th>Age</th></tr>{passengers}</table>\
         </body></html>"
    )
}

pub struct ConfirmationNotifier {
    bookings: Arc<dyn BookingRepository>,
    email_logs: Arc<dyn EmailLogRepository>,
    mailer: Arc<dyn Mailer>,
    environment: String,
}

impl ConfirmationNotifier {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        email_logs: Arc<dyn EmailLogRepository>,
        mailer: Arc<dyn Mailer>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            bookings,
            email_logs,
            mailer,
            environment: environment.into(),
        }
    }

    pub async fn send_confirmation(
        &self,
        reference: &str,
        recipient: &str,
    ) -> Result<EmailReceipt, NotificationError> {
        let recipient = recipient.trim();
        if recipient.is_empty() || !recipient.contains('@') {
            return Err(NotificationError::InvalidRecipient(recipient.to_string()));
        }

        let pnr = normalize_reference(reference)?;
        let booking = self
            .bookings
            .find_by_reference(&pnr)
            .await
            .map_err(BookingError::persistence)?
            .ok_or_else(|| BookingError::NotFound(pnr.clone()))?;

        let email = OutboundEmail {
            recipient: recipient.to_string(),
            subject: confirmation_subject(&booking.pnr),
            html_body: render_confirmation(&booking),
        };

        let entry = EmailLog {
            id: 0,
            pnr: booking.pnr.clone(),
            recipient: email.recipient.clone(),
            subject: email.subject.clone(),
            body: email.html_body.clone(),
            environment: self.environment.clone(),
            sent_at: Utc::now(),
        };
        let log_id = match self.email_logs.append(&entry).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(pnr = %booking.pnr, error = %e, "Failed to record e-mail log entry");
                None
            }
        };

        let (delivered, error) = match self.mailer.send(&email).await {
            Ok(()) => (true, None),
            Err(e) => {
                warn!(pnr = %booking.pnr, to = %redact_email(recipient), error = %e, "Confirmation e-mail not delivered");
                (false, Some(e.to_string()))
            }
        };

        info!(pnr = %booking.pnr, to = %redact_email(recipient), delivered, log_id = ?log_id, "Confirmation e-mail processed");

        Ok(EmailReceipt {
            pnr: booking.pnr,
            recipient: email.recipient,
            subject: email.subject,
            log_id,
            delivered,
            error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_core::notification::MailError;
    use aerobook_core::repository::RepositoryError;
    use aerobook_core::{BookingStatus, PassengerManifest};
    use aerobook_store::{InMemoryBookingRepository, InMemoryEmailLogRepository};
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    fn booking() -> Booking {
        Booking {
            id: Uuid::new_v4(),
            pnr: "ABC234".to_string(),
            flight_id: "MAD-JFK".to_string(),
            fare_type: "basic".to_string(),
            fare_price: dec!(250),
            currency: "EUR".to_string(),
            service_fee: Some(dec!(10)),
            service_fee_currency: "USD".to_string(),
            total_price: dec!(259.2),
            contact_email: "a@b.com".to_string(),
            contact_phone: "+34600000000".to_string(),
            adults: 1,
            children: 1,
            infants: 0,
            passengers: PassengerManifest {
                adults: vec![Passenger::new("Ana <b>", "Diaz", PassengerType::Adult)],
                children: vec![Passenger {
                    age: Some(8),
                    ..Passenger::new("Leo", "Diaz", PassengerType::Child)
                }],
                infants: vec![],
            },
            provider_order_id: None,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutboundEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Delivery("relay refused".to_string()));
            }
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }

    struct BrokenLog;

    #[async_trait]
    impl EmailLogRepository for BrokenLog {
        async fn append(&self, _entry: &EmailLog) -> Result<i64, RepositoryError> {
            Err(RepositoryError::Unavailable("log table gone".to_string()))
        }
        async fn list_for_reference(&self, _pnr: &str) -> Result<Vec<EmailLog>, RepositoryError> {
            Ok(vec![])
        }
    }

    async fn store_with_booking() -> Arc<InMemoryBookingRepository> {
        let repo = Arc::new(InMemoryBookingRepository::new());
        repo.insert_booking(&booking()).await.unwrap();
        repo
    }

    #[test]
    fn test_render_escapes_and_greets_lead_adult() {
        let html = render_confirmation(&booking());
        assert!(html.contains("Dear Ana &lt;b&gt; Diaz"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("<th>Origin</th><td>MAD</td>"));
        assert!(html.contains("<th>Service fee</th><td>10.00 USD</td>"));
        assert!(html.contains("<th>Total</th><td>259.20 EUR</td>"));
        assert!(html.contains("<td>Leo Diaz</td><td>Child</td><td>8</td>"));
    }

    #[test]
    fn test_render_without_adults_or_fee() {
        let mut b = booking();
        b.passengers.adults.clear();
        b.service_fee = Some(Decimal::ZERO);
        let html = render_confirmation(&b);
        assert!(html.contains("Dear Passenger"));
        assert!(!html.contains("Service fee"));
    }

    #[tokio::test]
    async fn test_send_logs_and_delivers() {
        let logs = Arc::new(InMemoryEmailLogRepository::new());
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = ConfirmationNotifier::new(store_with_booking().await, logs.clone(), mailer.clone(), "testing");

        let receipt = notifier.send_confirmation(" abc234 ", "ana@example.com").await.unwrap();
        assert!(receipt.delivered);
        assert_eq!(receipt.log_id, Some(1));
        assert_eq!(receipt.subject, "Booking Confirmation - PNR: ABC234");

        let entries = logs.list_for_reference("ABC234").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].environment, "testing");
        assert_eq!(entries[0].recipient, "ana@example.com");
        assert_eq!(mailer.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_and_still_logged() {
        let logs = Arc::new(InMemoryEmailLogRepository::new());
        let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let notifier = ConfirmationNotifier::new(store_with_booking().await, logs.clone(), mailer, "testing");

        let receipt = notifier.send_confirmation("ABC234", "ana@example.com").await.unwrap();
        assert!(!receipt.delivered);
        assert_eq!(receipt.error.as_deref(), Some("Mail delivery failed: relay refused"));
        assert_eq!(logs.list_for_reference("ABC234").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_log_failure_does_not_stop_delivery() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = ConfirmationNotifier::new(store_with_booking().await, Arc::new(BrokenLog), mailer.clone(), "testing");

        let receipt = notifier.send_confirmation("ABC234", "ana@example.com").await.unwrap();
        assert!(receipt.delivered);
        assert_eq!(receipt.log_id, None);
        assert_eq!(mailer.sent.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_recipient_and_unknown_reference() {
        let notifier = ConfirmationNotifier::new(
            store_with_booking().await,
            Arc::new(InMemoryEmailLogRepository::new()),
            Arc::new(RecordingMailer::default()),
            "testing",
        );

        assert!(matches!(
            notifier.send_confirmation("ABC234", "not-an-address").await,
            Err(NotificationError::InvalidRecipient(_))
        ));
        assert!(matches!(
            notifier.send_confirmation("ZZZZZZ", "ana@example.com").await,
            Err(NotificationError::Booking(BookingError::NotFound(_)))
        ));
    }
}
