pub mod booking;
pub mod iata;
pub mod notification;
pub mod provider;
pub mod rates;
pub mod repository;

pub use booking::{
    is_well_formed_pnr, Booking, BookingStatus, Contact, EmailLog, Passenger, PassengerCounts,
    PassengerManifest, PassengerType, PNR_LENGTH,
};
pub use provider::{
    OrderProvider, OrderReconciler, ProviderConfirmation, ProviderRejection, ProviderResult,
    TransportError,
};
pub use repository::{BookingRepository, EmailLogRepository, RepositoryError};

/// Failure of a booking operation. Nothing is persisted when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Provider refused the order and the refusal is not fallback-eligible.
    #[error("{message}")]
    ProviderRejected {
        message: String,
        rejection: ProviderRejection,
    },

    /// The local write failed. `provider` holds the provider-side order, if
    /// one was created, so the caller can reconcile.
    #[error("Booking could not be stored: {source}")]
    Persistence {
        #[source]
        source: RepositoryError,
        provider: Option<ProviderConfirmation>,
    },

    #[error("No free reference code after {0} attempts")]
    ReferenceSpaceExhausted(u32),

    #[error("No booking found for reference {0}")]
    NotFound(String),
}

impl BookingError {
    pub fn persistence(source: RepositoryError) -> Self {
        BookingError::Persistence {
            source,
            provider: None,
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_error_displays_provider_message() {
        let rejection = ProviderRejection {
            status: 400,
            error_code: Some("477".to_string()),
            error_title: Some("INVALID FORMAT".to_string()),
            raw_body: "{}".to_string(),
        };
        let err = BookingError::ProviderRejected {
            message: rejection.failure_message(),
            rejection,
        };
        assert_eq!(err.to_string(), "Error 477: INVALID FORMAT");
    }

    #[test]
    fn test_transport_error_is_surfaced_verbatim() {
        let err: BookingError = TransportError::Authentication("401 Unauthorized".to_string()).into();
        assert_eq!(err.to_string(), "Provider authentication failed: 401 Unauthorized");
    }
}
