//! Wire models for the flight distribution provider (Amadeus Self-Service shape).
//!
//! Prices travel as decimal strings on this API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Flight Create Orders request
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightOrderRequest {
    pub data: FlightOrderData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOrderData {
    #[serde(rename = "type")]
    pub kind: String,
    pub flight_offers: Vec<FlightOffer>,
    pub travelers: Vec<Traveler>,
    pub remarks: Remarks,
    pub ticketing_agreement: TicketingAgreement,
    pub contacts: Vec<OrderContact>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub source: String,
    pub instant_ticketing_required: bool,
    pub non_homogeneous: bool,
    pub one_way: bool,
    pub last_ticketing_date: String,
    pub number_of_bookable_seats: u32,
    pub itineraries: Vec<Itinerary>,
    pub price: OfferPrice,
    pub pricing_options: PricingOptions,
    pub validating_airline_codes: Vec<String>,
    pub traveler_pricings: Vec<TravelerPricing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub duration: String,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub carrier_code: String,
    pub number: String,
    pub aircraft: Aircraft,
    pub operating: OperatingCarrier,
    pub duration: String,
    pub id: String,
    pub number_of_stops: u32,
    #[serde(rename = "blacklistedInEU")]
    pub blacklisted_in_eu: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    pub terminal: String,
    pub at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Aircraft {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperatingCarrier {
    pub carrier_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferPrice {
    pub currency: String,
    pub total: String,
    pub base: String,
    pub fees: Vec<Fee>,
    pub grand_total: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fee {
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingOptions {
    pub fare_type: Vec<String>,
    pub included_checked_bags_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPricing {
    pub traveler_id: String,
    pub fare_option: String,
    pub traveler_type: String,
    pub price: TravelerPrice,
    pub fare_details_by_segment: Vec<FareDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_adult_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TravelerPrice {
    pub currency: String,
    pub total: String,
    pub base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FareDetails {
    pub segment_id: String,
    pub cabin: String,
    pub fare_basis: String,
    pub class: String,
    pub included_checked_bags: CheckedBags,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckedBags {
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub id: String,
    pub date_of_birth: String,
    pub name: TravelerName,
    pub gender: String,
    pub contact: TravelerContact,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub documents: Vec<TravelDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelerName {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelerContact {
    pub email_address: String,
    pub phones: Vec<Phone>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Phone {
    pub device_type: String,
    pub country_calling_code: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelDocument {
    pub document_type: String,
    pub birth_place: String,
    pub issuance_location: String,
    pub issuance_date: String,
    pub number: String,
    pub expiry_date: String,
    pub issuance_country: String,
    pub validity_country: String,
    pub nationality: String,
    pub holder: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Remarks {
    pub general: Vec<GeneralRemark>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralRemark {
    pub sub_type: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketingAgreement {
    pub option: String,
    pub delay: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderContact {
    pub addressee_name: TravelerName,
    pub company_name: String,
    pub purpose: String,
    pub phones: Vec<Phone>,
    pub email_address: String,
    pub address: PostalAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    pub lines: Vec<String>,
    pub postal_code: String,
    pub city_name: String,
    pub country_code: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct FlightOrderResponse {
    pub data: FlightOrderCreated,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOrderCreated {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub associated_records: Vec<AssociatedRecord>,
}

impl FlightOrderCreated {
    /// The provider's own confirmation code, empty when none was returned.
    pub fn reference(&self) -> String {
        self.associated_records
            .first()
            .map(|r| r.reference.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssociatedRecord {
    #[serde(default)]
    pub reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

/// The provider sends `code` as a number; older gateways send a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ErrorEntry {
    pub fn code_string(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_created_reference() {
        let json = r#"{"data":{"id":"eJzTd9f3","associatedRecords":[{"reference":"XYZ123","creationDate":"2025-01-01"}]}}"#;
        let resp: FlightOrderResponse = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(resp.data.id, "eJzTd9f3");
        assert_eq!(resp.data.reference(), "XYZ123");
    }

    #[test]
    fn test_order_created_without_records() {
        let json = r#"{"data":{"id":"eJzTd9f3"}}"#;
        let resp: FlightOrderResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data.reference(), "");
    }

    #[test]
    fn test_error_code_accepts_number_or_string() {
        let json = r#"{"errors":[{"code":34651,"title":"Segment sell failure"},{"code":"477","title":"INVALID FORMAT"}]}"#;
        let resp: ErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.errors[0].code_string().as_deref(), Some("34651"));
        assert_eq!(resp.errors[1].code_string().as_deref(), Some("477"));
    }
}
