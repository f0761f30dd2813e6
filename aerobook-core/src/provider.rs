use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::iata::FlightOrderRequest;

/// Order created on the provider side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfirmation {
    pub order_id: String,
    /// Provider-issued PNR; empty when the response carried none.
    pub reference: String,
}

/// Structured refusal from the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderRejection {
    pub status: u16,
    pub error_code: Option<String>,
    pub error_title: Option<String>,
    pub raw_body: String,
}

impl ProviderRejection {
    /// User-facing failure text: `Error {code}: {title}`.
    pub fn failure_message(&self) -> String {
        match &self.error_code {
            Some(code) => format!(
                "Error {}: {}",
                code,
                self.error_title.as_deref().unwrap_or_default()
            ),
            None => "Error processing the booking".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResult {
    Confirmed(ProviderConfirmation),
    Rejected(ProviderRejection),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Provider authentication failed: {0}")]
    Authentication(String),
    #[error("Provider call timed out after {0}s")]
    Timeout(u64),
    #[error("Provider unreachable: {0}")]
    Network(String),
    #[error("Provider sent an unreadable response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait OrderProvider: Send + Sync {
    /// Authenticate and submit one order-creation request.
    async fn submit_order(
        &self,
        payload: &FlightOrderRequest,
    ) -> Result<ProviderResult, TransportError>;
}

/// Answers "did the provider actually create this order" independently of
/// the local store, for reconciling a dual-write failure.
///
/// Orders are addressed by the provider's order id, not by the six-character
/// reference: the reference may have been replaced by a local code. A
/// `BookingError::Persistence` raised after confirmation carries the
/// [`ProviderConfirmation`] whose `order_id` is the key to pass here.
#[async_trait]
pub trait OrderReconciler: Send + Sync {
    async fn find_order(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<ProviderConfirmation>, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message() {
        let rejection = ProviderRejection {
            status: 400,
            error_code: Some("477".to_string()),
            error_title: Some("INVALID FORMAT".to_string()),
            raw_body: String::new(),
        };
        assert_eq!(rejection.failure_message(), "Error 477: INVALID FORMAT");

        let generic = ProviderRejection {
            error_code: None,
            ..rejection
        };
        assert_eq!(generic.failure_message(), "Error processing the booking");
    }
}
