use aerobook_core::{Booking, BookingError, Contact, PassengerManifest};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fallback::BookingOutcome;

/// A traveler's confirmed selection, as submitted for booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBooking {
    pub flight_id: String,
    pub fare_type: String,
    pub fare_price: Decimal,
    pub currency: String,
    #[serde(default)]
    pub service_fee: Option<Decimal>,
    /// Defaults to the fare currency.
    #[serde(default)]
    pub service_fee_currency: Option<String>,
    /// Cabin sent to the provider; the configured default when absent.
    #[serde(default)]
    pub travel_class: Option<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub passengers: PassengerManifest,
}

/// Column widths of the `bookings` table; longer values are rejected here
/// rather than after the provider has taken the order.
pub const MAX_FLIGHT_ID_LEN: usize = 100;
pub const MAX_FARE_TYPE_LEN: usize = 20;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 20;
/// Amounts are stored as `NUMERIC(12, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn too_long(value: &str, max: usize) -> bool {
    value.trim().chars().count() > max
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl NewBooking {
    /// Rejects malformed input before anything is drawn or sent.
    pub fn validate(&self) -> Result<(), BookingError> {
        let invalid = |msg: &str| Err(BookingError::Validation(msg.to_string()));

        if self.flight_id.trim().is_empty() {
            return invalid("flight_id is required");
        }
        if self.fare_type.trim().is_empty() {
            return invalid("fare_type is required");
        }
        if too_long(&self.flight_id, MAX_FLIGHT_ID_LEN) {
            return Err(BookingError::Validation(format!(
                "flight_id cannot exceed {} characters",
                MAX_FLIGHT_ID_LEN
            )));
        }
        if too_long(&self.fare_type, MAX_FARE_TYPE_LEN) {
            return Err(BookingError::Validation(format!(
                "fare_type cannot exceed {} characters",
                MAX_FARE_TYPE_LEN
            )));
        }
        if self.fare_price <= Decimal::ZERO {
            return invalid("fare_price must be greater than zero");
        }
        if self.fare_price >= MAX_AMOUNT {
            return Err(BookingError::Validation(format!("fare_price must be below {}", MAX_AMOUNT)));
        }
        if !is_currency_code(&self.currency) {
            return invalid("currency must be a 3-letter code");
        }
        if let Some(fee) = self.service_fee {
            if fee < Decimal::ZERO {
                return invalid("service_fee cannot be negative");
            }
            if fee >= MAX_AMOUNT {
                return Err(BookingError::Validation(format!("service_fee must be below {}", MAX_AMOUNT)));
            }
        }
        if let Some(code) = &self.service_fee_currency {
            if !is_currency_code(code) {
                return invalid("service_fee_currency must be a 3-letter code");
            }
        }
        if self.contact_email.trim().is_empty() {
            return invalid("contact_email is required");
        }
        if too_long(&self.contact_email, MAX_EMAIL_LEN) {
            return Err(BookingError::Validation(format!(
                "contact_email cannot exceed {} characters",
                MAX_EMAIL_LEN
            )));
        }
        if self.contact_phone.trim().is_empty() {
            return invalid("contact_phone is required");
        }
        if too_long(&self.contact_phone, MAX_PHONE_LEN) {
            return Err(BookingError::Validation(format!(
                "contact_phone cannot exceed {} characters",
                MAX_PHONE_LEN
            )));
        }
        if self.adults == 0 && self.infants > 0 {
            return invalid("infants must travel with an adult");
        }
        if self.adults == 0 {
            return invalid("at least one adult is required");
        }

        let listed = self.passengers.counts();
        if listed.adults != self.adults || listed.children != self.children || listed.infants != self.infants {
            return Err(BookingError::Validation(format!(
                "passenger counts ({} adults, {} children, {} infants) do not match the passenger list ({}, {}, {})",
                self.adults, self.children, self.infants, listed.adults, listed.children, listed.infants
            )));
        }
        if self
            .passengers
            .iter()
            .any(|p| p.first_name.trim().is_empty() || p.last_name.trim().is_empty())
        {
            return invalid("every passenger needs a first and last name");
        }
        Ok(())
    }

    pub fn contact(&self) -> Contact {
        Contact {
            email: self.contact_email.trim().to_string(),
            phone: self.contact_phone.trim().to_string(),
        }
    }

    pub fn service_fee_amount(&self) -> Decimal {
        self.service_fee.unwrap_or(Decimal::ZERO)
    }

    pub fn service_fee_currency(&self) -> String {
        self.service_fee_currency
            .clone()
            .unwrap_or_else(|| self.currency.clone())
            .to_uppercase()
    }
}

/// Result of a successful `create_booking`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub outcome: BookingOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_core::{Passenger, PassengerType};
    use rust_decimal_macros::dec;

    fn request() -> NewBooking {
        NewBooking {
            flight_id: "MAD-JFK".to_string(),
            fare_type: "basic".to_string(),
            fare_price: dec!(250),
            currency: "EUR".to_string(),
            service_fee: None,
            service_fee_currency: None,
            travel_class: None,
            contact_email: "a@b.com".to_string(),
            contact_phone: "+34600000000".to_string(),
            adults: 1,
            children: 0,
            infants: 0,
            passengers: PassengerManifest {
                adults: vec![Passenger::new("Ana", "Diaz", PassengerType::Adult)],
                ..Default::default()
            },
        }
    }

    fn rejected(req: NewBooking) -> String {
        match req.validate() {
            Err(BookingError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_fare() {
        let msg = rejected(NewBooking { fare_price: Decimal::ZERO, ..request() });
        assert!(msg.contains("fare_price"));
    }

    #[test]
    fn test_rejects_bad_currency() {
        rejected(NewBooking { currency: "EURO".to_string(), ..request() });
        rejected(NewBooking { service_fee_currency: Some("U$D".to_string()), ..request() });
    }

    #[test]
    fn test_rejects_negative_fee() {
        rejected(NewBooking { service_fee: Some(dec!(-1)), ..request() });
    }

    #[test]
    fn test_rejects_values_wider_than_their_columns() {
        let msg = rejected(NewBooking { contact_phone: "+".to_string() + &"3".repeat(20), ..request() });
        assert_eq!(msg, "contact_phone cannot exceed 20 characters");

        let msg = rejected(NewBooking { fare_type: "f".repeat(21), ..request() });
        assert_eq!(msg, "fare_type cannot exceed 20 characters");

        let msg = rejected(NewBooking {
            contact_email: format!("{}@b.com", "a".repeat(95)),
            ..request()
        });
        assert_eq!(msg, "contact_email cannot exceed 100 characters");

        let msg = rejected(NewBooking { flight_id: format!("MAD-{}", "J".repeat(97)), ..request() });
        assert_eq!(msg, "flight_id cannot exceed 100 characters");

        rejected(NewBooking { fare_price: dec!(1000000000), ..request() });
        rejected(NewBooking { service_fee: Some(dec!(1000000000)), ..request() });
    }

    #[test]
    fn test_accepts_values_at_column_width() {
        let req = NewBooking {
            contact_phone: "3".repeat(20),
            fare_type: "f".repeat(20),
            contact_email: format!("{}@b.com", "a".repeat(94)),
            ..request()
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_infants_without_adults() {
        let mut req = request();
        req.adults = 0;
        req.infants = 1;
        req.passengers = PassengerManifest {
            infants: vec![Passenger::new("Eva", "Diaz", PassengerType::Infant)],
            ..Default::default()
        };
        assert_eq!(rejected(req), "infants must travel with an adult");
    }

    #[test]
    fn test_rejects_count_mismatch() {
        let msg = rejected(NewBooking { children: 1, ..request() });
        assert!(msg.contains("do not match"));
    }

    #[test]
    fn test_rejects_blank_names() {
        let mut req = request();
        req.passengers.adults[0].last_name = " ".to_string();
        rejected(req);
    }

    #[test]
    fn test_fee_currency_defaults_to_fare_currency() {
        assert_eq!(request().service_fee_currency(), "EUR");
        assert_eq!(request().service_fee_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_request_deserializes_with_optional_fields_missing() {
        let json = r#"{
            "flight_id": "MAD-JFK",
            "fare_type": "basic",
            "fare_price": 250.0,
            "currency": "EUR",
            "contact_email": "a@b.com",
            "contact_phone": "+34600000000",
            "adults": 1,
            "passengers": {"adults": [{"firstName": "Ana", "lastName": "Diaz", "type": "ADULT"}]}
        }"#;
        let req: NewBooking = serde_json::from_str(json).unwrap();
        assert_eq!(req.fare_price, dec!(250));
        assert_eq!(req.children, 0);
        assert!(req.validate().is_ok());
    }
}
