use aerobook_core::{Booking, BookingStatus, PassengerManifest};
use aerobook_order::{BookingOutcome, EmailReceipt, NewBooking};
use aerobook_shared::Masked;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub pnr: String,
    pub flight_id: String,
    pub origin: String,
    pub destination: String,
    pub fare_type: String,
    pub fare_price: Decimal,
    pub currency: String,
    pub service_fee: Option<Decimal>,
    pub service_fee_currency: String,
    pub total_price: Decimal,
    pub contact_email: Masked<String>,
    pub contact_phone: Masked<String>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub passengers: PassengerManifest,
    pub provider_order_id: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        let (origin, destination) = b.route();
        Self {
            id: b.id,
            pnr: b.pnr,
            flight_id: b.flight_id,
            origin,
            destination,
            fare_type: b.fare_type,
            fare_price: b.fare_price,
            currency: b.currency,
            service_fee: b.service_fee,
            service_fee_currency: b.service_fee_currency,
            total_price: b.total_price,
            contact_email: Masked(b.contact_email),
            contact_phone: Masked(b.contact_phone),
            adults: b.adults,
            children: b.children,
            infants: b.infants,
            passengers: b.passengers,
            provider_order_id: b.provider_order_id,
            status: b.status,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub booking: BookingResponse,
    pub outcome: BookingOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking))
        .route("/v1/bookings/{pnr}", get(get_booking))
        .route("/v1/bookings/{pnr}/email", post(send_confirmation))
}

async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<NewBooking>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;

    let confirmation = state.bookings.create_booking(req).await?;
    info!(
        pnr = %confirmation.booking.pnr,
        outcome = ?confirmation.outcome,
        "Booking created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking: confirmation.booking.into(),
            outcome: confirmation.outcome,
            provider_message: confirmation.provider_message,
        }),
    ))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state.bookings.find_booking(&pnr).await?;
    Ok(Json(booking.into()))
}

async fn send_confirmation(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Result<Json<EmailReceipt>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::ValidationError(e.body_text()))?;
    let receipt = state.notifier.send_confirmation(&pnr, &req.email).await?;
    Ok(Json(receipt))
}
