use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Booking status in the lifecycle. Bookings are never deleted, only transitioned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

impl Passenger {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, passenger_type: PassengerType) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            passenger_type,
            age: None,
            document: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Ordered passenger list, grouped by type. Persisted as one JSON blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PassengerManifest {
    #[serde(default)]
    pub adults: Vec<Passenger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Passenger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infants: Vec<Passenger>,
}

impl PassengerManifest {
    /// Adults, then children, then infants.
    pub fn iter(&self) -> impl Iterator<Item = &Passenger> {
        self.adults.iter().chain(self.children.iter()).chain(self.infants.iter())
    }

    pub fn counts(&self) -> PassengerCounts {
        PassengerCounts {
            adults: self.adults.len() as u32,
            children: self.children.len() as u32,
            infants: self.infants.len() as u32,
        }
    }

    pub fn lead_passenger(&self) -> Option<&Passenger> {
        self.adults.first()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PassengerCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl PassengerCounts {
    pub fn seated(&self) -> u32 {
        self.adults + self.children
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub email: String,
    pub phone: String,
}

pub const PNR_LENGTH: usize = 6;

/// Exactly six ASCII letters or digits. Provider-issued codes are held to
/// this too, so they fit the same column as locally drawn ones.
pub fn is_well_formed_pnr(code: &str) -> bool {
    code.len() == PNR_LENGTH && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// The durable record of a confirmed (or cancelled) reservation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub pnr: String,
    pub flight_id: String,
    pub fare_type: String,
    pub fare_price: Decimal,
    pub currency: String,
    pub service_fee: Option<Decimal>,
    pub service_fee_currency: String,
    pub total_price: Decimal,
    pub contact_email: String,
    pub contact_phone: String,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub passengers: PassengerManifest,
    pub provider_order_id: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn counts(&self) -> PassengerCounts {
        PassengerCounts {
            adults: self.adults,
            children: self.children,
            infants: self.infants,
        }
    }

    /// Origin and destination as encoded in the flight id (`"MAD-JFK"`).
    /// Missing sides come back empty.
    pub fn route(&self) -> (String, String) {
        let mut parts = self.flight_id.split('-');
        let origin = parts.next().unwrap_or_default().trim().to_string();
        let destination = parts.next().unwrap_or_default().trim().to_string();
        (origin, destination)
    }

    /// Checks the record-level invariants before it is written.
    pub fn check_invariants(&self) -> Result<(), String> {
        if !is_well_formed_pnr(&self.pnr) {
            return Err(format!("reference code {:?} is not {} letters or digits", self.pnr, PNR_LENGTH));
        }
        if self.counts() != self.passengers.counts() {
            return Err(format!(
                "passenger counts {:?} do not match manifest {:?}",
                self.counts(),
                self.passengers.counts()
            ));
        }
        if self.status == BookingStatus::Confirmed {
            if self.total_price <= Decimal::ZERO {
                return Err("confirmed booking must have a positive total".to_string());
            }
            if self.adults == 0 {
                return Err("confirmed booking must have at least one adult".to_string());
            }
        }
        Ok(())
    }
}

/// Append-only record of one confirmation e-mail attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailLog {
    pub id: i64,
    pub pnr: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub environment: String,
    pub sent_at: DateTime<Utc>,
}
