use aerobook_core::BookingError;
use aerobook_order::NotificationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    /// Provider refused the order.
    RejectedError { message: String, code: Option<String> },
    UpstreamError(String),
    /// Local write failed; `provider_order_id` is set when the provider had
    /// already created the order.
    StorageError { message: String, provider_order_id: Option<String> },
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::RejectedError { message, code } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "code": code }),
            ),
            AppError::UpstreamError(msg) => {
                tracing::error!("Provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, json!({ "error": msg }))
            }
            AppError::StorageError { message, provider_order_id } => {
                tracing::error!(provider_order_id = ?provider_order_id, "Storage error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Booking could not be stored", "provider_order_id": provider_order_id }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::NotFound(pnr) => AppError::NotFoundError(format!("Booking {} not found", pnr)),
            BookingError::ProviderRejected { message, rejection } => AppError::RejectedError {
                message,
                code: rejection.error_code,
            },
            BookingError::Transport(e) => AppError::UpstreamError(e.to_string()),
            BookingError::Persistence { source, provider } => AppError::StorageError {
                message: source.to_string(),
                provider_order_id: provider.map(|p| p.order_id),
            },
            err @ BookingError::ReferenceSpaceExhausted(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::InvalidRecipient(addr) => {
                AppError::ValidationError(format!("Invalid recipient address: {}", addr))
            }
            NotificationError::Booking(e) => e.into(),
        }
    }
}
