use aerobook_core::repository::{BookingRepository, RepositoryError};
use aerobook_core::{Booking, BookingStatus, PassengerManifest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::map_sqlx_error;

pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    pnr: String,
    flight_id: String,
    fare_type: String,
    fare_price: Decimal,
    currency: String,
    service_fee: Option<Decimal>,
    service_fee_currency: String,
    total_price: Decimal,
    contact_email: String,
    contact_phone: String,
    adults: i32,
    children: i32,
    infants: i32,
    passenger_data: serde_json::Value,
    provider_order_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepositoryError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        let passengers: PassengerManifest = serde_json::from_value(row.passenger_data)
            .map_err(|e| RepositoryError::Corrupt(format!("passenger_data for {}: {}", row.pnr, e)))?;
        let status: BookingStatus = row
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Corrupt(e))?;

        Ok(Booking {
            id: row.id,
            pnr: row.pnr,
            flight_id: row.flight_id,
            fare_type: row.fare_type,
            fare_price: row.fare_price,
            currency: row.currency,
            service_fee: row.service_fee,
            service_fee_currency: row.service_fee_currency,
            total_price: row.total_price,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            adults: row.adults.max(0) as u32,
            children: row.children.max(0) as u32,
            infants: row.infants.max(0) as u32,
            passengers,
            provider_order_id: row.provider_order_id,
            status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepository {
    async fn reference_exists(&self, pnr: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE pnr = $1)")
            .bind(pnr)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, pnr))?;
        Ok(exists)
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), RepositoryError> {
        let passenger_data = serde_json::to_value(&booking.passengers)
            .map_err(|e| RepositoryError::Corrupt(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, pnr, flight_id, fare_type, fare_price, currency, service_fee, service_fee_currency,
                                  total_price, contact_email, contact_phone, adults, children, infants,
                                  passenger_data, provider_order_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.pnr)
        .bind(&booking.flight_id)
        .bind(&booking.fare_type)
        .bind(booking.fare_price)
        .bind(&booking.currency)
        .bind(booking.service_fee)
        .bind(&booking.service_fee_currency)
        .bind(booking.total_price)
        .bind(&booking.contact_email)
        .bind(&booking.contact_phone)
        .bind(booking.adults as i32)
        .bind(booking.children as i32)
        .bind(booking.infants as i32)
        .bind(passenger_data)
        .bind(booking.provider_order_id.as_deref())
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &booking.pnr))?;

        Ok(())
    }

    async fn find_by_reference(&self, pnr: &str) -> Result<Option<Booking>, RepositoryError> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, pnr, flight_id, fare_type, fare_price, currency, service_fee, service_fee_currency,
                   total_price, contact_email, contact_phone, adults, children, infants,
                   passenger_data, provider_order_id, status, created_at
            FROM bookings
            WHERE pnr = $1
            "#,
        )
        .bind(pnr)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, pnr))?;

        row.map(Booking::try_from).transpose()
    }
}
