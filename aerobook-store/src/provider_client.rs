use aerobook_core::iata::{AccessTokenResponse, ErrorResponse, FlightOrderRequest, FlightOrderResponse};
use aerobook_core::provider::{
    OrderProvider, OrderReconciler, ProviderConfirmation, ProviderRejection, ProviderResult,
    TransportError,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::app_config::ProviderConfig;

/// HTTP client for the provider's auth and flight-order endpoints.
///
/// Every order submission runs its own client-credentials exchange; tokens
/// are not cached between bookings.
#[derive(Clone)]
pub struct HttpOrderProvider {
    http: reqwest::Client,
    auth_url: String,
    orders_url: String,
    client_id: String,
    client_secret: String,
    timeout_secs: u64,
}

impl HttpOrderProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(format!("aerobook/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            http,
            auth_url: config.auth_url.clone(),
            orders_url: config.orders_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            timeout_secs: config.timeout_seconds,
        })
    }

    async fn access_token(&self) -> Result<String, TransportError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response = self
            .http
            .post(&self.auth_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Provider token exchange rejected");
            return Err(TransportError::Authentication(format!("{}: {}", status, body)));
        }

        let token: AccessTokenResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Authentication(format!("unreadable token response: {}", e)))?;
        Ok(token.access_token)
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Reads an order-creation response. 200/201 is a confirmation; any other
/// status is a rejection, generic when the error body cannot be parsed.
pub fn interpret_order_response(status: u16, body: &str) -> Result<ProviderResult, TransportError> {
    if status == 200 || status == 201 {
        let created: FlightOrderResponse = serde_json::from_str(body)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
        return Ok(ProviderResult::Confirmed(ProviderConfirmation {
            reference: created.data.reference(),
            order_id: created.data.id,
        }));
    }

    let first_error = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|parsed| parsed.errors.into_iter().next());

    let (error_code, error_title) = match first_error {
        Some(entry) => (entry.code_string(), entry.title),
        None => (None, None),
    };

    Ok(ProviderResult::Rejected(ProviderRejection {
        status,
        error_code,
        error_title,
        raw_body: body.to_string(),
    }))
}

#[async_trait]
impl OrderProvider for HttpOrderProvider {
    async fn submit_order(
        &self,
        payload: &FlightOrderRequest,
    ) -> Result<ProviderResult, TransportError> {
        let token = self.access_token().await?;

        debug!(travelers = payload.data.travelers.len(), "Submitting flight order");
        let response = self
            .http
            .post(&self.orders_url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        let result = interpret_order_response(status, &body)?;
        match &result {
            ProviderResult::Confirmed(c) => {
                info!(order_id = %c.order_id, reference = %c.reference, "Provider confirmed order")
            }
            ProviderResult::Rejected(r) => warn!(
                status,
                code = r.error_code.as_deref().unwrap_or("none"),
                title = r.error_title.as_deref().unwrap_or(""),
                "Provider rejected order"
            ),
        }
        Ok(result)
    }
}

#[async_trait]
impl OrderReconciler for HttpOrderProvider {
    async fn find_order(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<ProviderConfirmation>, TransportError> {
        let token = self.access_token().await?;
        let url = format!("{}/{}", self.orders_url, provider_order_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body = response.text().await.map_err(|e| self.transport_error(e))?;
                match interpret_order_response(200, &body)? {
                    ProviderResult::Confirmed(c) => Ok(Some(c)),
                    ProviderResult::Rejected(_) => Ok(None),
                }
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(TransportError::Network(format!("order lookup returned {}: {}", s, body)))
            }
        }
    }
}
