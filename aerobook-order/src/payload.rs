//! Translates a booking selection into the provider's flight-order request.
//!
//! The search-time offer is not retained, so the offer is re-assembled from a
//! minimal descriptor: one segment between the airports encoded in the flight
//! id, fixed schedule, carrier and identity placeholders. Fare rules, real
//! segments and timings are lost; full-fidelity ordering needs the original
//! offer object.

use aerobook_core::iata::{
    Aircraft, CheckedBags, FareDetails, Fee, FlightEndpoint, FlightOffer, FlightOrderData,
    FlightOrderRequest, GeneralRemark, Itinerary, OfferPrice, OperatingCarrier, OrderContact,
    Phone, PostalAddress, PricingOptions, Remarks, Segment, TicketingAgreement, TravelDocument,
    Traveler, TravelerContact, TravelerName, TravelerPrice, TravelerPricing,
};
use aerobook_core::{Contact, Passenger, PassengerManifest, PassengerType};
use rust_decimal::Decimal;

use crate::fare::FareBreakdown;

pub const PLACEHOLDER_ORIGIN: &str = "LAX";
pub const PLACEHOLDER_DESTINATION: &str = "GDL";

const CARRIER: &str = "IB";
const DEPARTURE_AT: &str = "2025-05-01T10:00:00";
const ARRIVAL_AT: &str = "2025-05-01T12:00:00";
const LAST_TICKETING_DATE: &str = "2025-04-15";
const PLACEHOLDER_DOCUMENT: &str = "DUMMY123";
const COUNTRY_CALLING_CODE: &str = "34";

/// What the builder knows about the selected offer.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferDescriptor {
    /// `"ORIGIN-DEST"`
    pub flight_id: String,
    pub fare_type: String,
    pub cabin: String,
    pub currency: String,
    pub service_fee: Decimal,
    pub total_price: Decimal,
    pub fares: FareBreakdown,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Fare price must be positive, got {0}")]
    NonPositiveFare(String),
    #[error("An order needs at least one adult traveler")]
    NoAdults,
    #[error("Fare type is empty")]
    EmptyFareType,
}

/// Origin and destination from `"ORIGIN-DEST"`, placeholders for missing sides.
pub fn split_route(flight_id: &str) -> (String, String) {
    let Some((origin, destination)) = flight_id.split_once('-') else {
        return (PLACEHOLDER_ORIGIN.to_string(), PLACEHOLDER_DESTINATION.to_string());
    };
    let destination = destination.split('-').next().unwrap_or_default();
    let pick = |side: &str, fallback: &str| {
        let side = side.trim();
        if side.is_empty() { fallback.to_string() } else { side.to_uppercase() }
    };
    (pick(origin, PLACEHOLDER_ORIGIN), pick(destination, PLACEHOLDER_DESTINATION))
}

/// Provider-side phone number: digits without `+` or spaces.
fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| *c != '+' && !c.is_whitespace()).collect()
}

fn fare_initial(fare_type: &str) -> String {
    fare_type
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_default()
}

pub struct PayloadBuilder {
    agency_name: String,
}

impl PayloadBuilder {
    pub fn new(agency_name: impl Into<String>) -> Self {
        Self {
            agency_name: agency_name.into(),
        }
    }

    /// Deterministic: identical inputs give identical payloads.
    pub fn build(
        &self,
        offer: &OfferDescriptor,
        passengers: &PassengerManifest,
        contact: &Contact,
    ) -> Result<FlightOrderRequest, PayloadError> {
        if offer.fares.adult <= Decimal::ZERO {
            return Err(PayloadError::NonPositiveFare(offer.fares.adult.to_string()));
        }
        if passengers.adults.is_empty() {
            return Err(PayloadError::NoAdults);
        }
        if offer.fare_type.trim().is_empty() {
            return Err(PayloadError::EmptyFareType);
        }

        let phones = vec![Phone {
            device_type: "MOBILE".to_string(),
            country_calling_code: COUNTRY_CALLING_CODE.to_string(),
            number: normalize_phone(&contact.phone),
        }];

        let travelers: Vec<Traveler> = passengers
            .iter()
            .enumerate()
            .map(|(index, passenger)| self.traveler(index + 1, passenger, contact, &phones))
            .collect();

        let lead = &travelers[0].name;
        let contacts = vec![OrderContact {
            addressee_name: lead.clone(),
            company_name: self.agency_name.clone(),
            purpose: "STANDARD".to_string(),
            phones: phones.clone(),
            email_address: contact.email.clone(),
            address: PostalAddress {
                lines: vec!["Calle Principal 123".to_string()],
                postal_code: "28001".to_string(),
                city_name: "Madrid".to_string(),
                country_code: "ES".to_string(),
            },
        }];

        Ok(FlightOrderRequest {
            data: FlightOrderData {
                kind: "flight-order".to_string(),
                flight_offers: vec![self.flight_offer(offer, passengers)],
                travelers,
                remarks: Remarks {
                    general: vec![GeneralRemark {
                        sub_type: "GENERAL_MISCELLANEOUS".to_string(),
                        text: format!("Booking created through {}", self.agency_name),
                    }],
                },
                ticketing_agreement: TicketingAgreement {
                    option: "DELAY_TO_CANCEL".to_string(),
                    delay: "6D".to_string(),
                },
                contacts,
            },
        })
    }

    fn traveler(&self, id: usize, passenger: &Passenger, contact: &Contact, phones: &[Phone]) -> Traveler {
        let date_of_birth = match passenger.passenger_type {
            PassengerType::Adult => "1990-01-01",
            PassengerType::Child => "2010-01-01",
            PassengerType::Infant => "2023-01-01",
        };

        // Only adults carry a travel document
        let documents = if passenger.passenger_type == PassengerType::Adult {
            vec![TravelDocument {
                document_type: "PASSPORT".to_string(),
                birth_place: "Madrid".to_string(),
                issuance_location: "Madrid".to_string(),
                issuance_date: "2015-04-14".to_string(),
                number: passenger
                    .document
                    .clone()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_DOCUMENT.to_string()),
                expiry_date: "2025-04-14".to_string(),
                issuance_country: "ES".to_string(),
                validity_country: "ES".to_string(),
                nationality: "ES".to_string(),
                holder: true,
            }]
        } else {
            Vec::new()
        };

        Traveler {
            id: id.to_string(),
            date_of_birth: date_of_birth.to_string(),
            name: TravelerName {
                first_name: passenger.first_name.clone(),
                last_name: passenger.last_name.clone(),
            },
            gender: "MALE".to_string(),
            contact: TravelerContact {
                email_address: contact.email.clone(),
                phones: phones.to_vec(),
            },
            documents,
        }
    }

    fn flight_offer(&self, offer: &OfferDescriptor, passengers: &PassengerManifest) -> FlightOffer {
        let (origin, destination) = split_route(&offer.flight_id);
        let counts = passengers.counts();

        FlightOffer {
            kind: "flight-offer".to_string(),
            id: "1".to_string(),
            source: "GDS".to_string(),
            instant_ticketing_required: false,
            non_homogeneous: false,
            one_way: false,
            last_ticketing_date: LAST_TICKETING_DATE.to_string(),
            number_of_bookable_seats: counts.seated(),
            itineraries: vec![Itinerary {
                duration: "PT2H".to_string(),
                segments: vec![Segment {
                    departure: FlightEndpoint {
                        iata_code: origin,
                        terminal: "1".to_string(),
                        at: DEPARTURE_AT.to_string(),
                    },
                    arrival: FlightEndpoint {
                        iata_code: destination,
                        terminal: "2".to_string(),
                        at: ARRIVAL_AT.to_string(),
                    },
                    carrier_code: CARRIER.to_string(),
                    number: "1234".to_string(),
                    aircraft: Aircraft { code: "320".to_string() },
                    operating: OperatingCarrier { carrier_code: CARRIER.to_string() },
                    duration: "PT2H".to_string(),
                    id: "1".to_string(),
                    number_of_stops: 0,
                    blacklisted_in_eu: false,
                }],
            }],
            price: OfferPrice {
                currency: offer.currency.clone(),
                total: offer.total_price.to_string(),
                base: offer.fares.adult.to_string(),
                fees: vec![Fee {
                    amount: offer.service_fee.to_string(),
                    kind: "SUPPLIER".to_string(),
                }],
                grand_total: offer.total_price.to_string(),
            },
            pricing_options: PricingOptions {
                fare_type: vec!["PUBLISHED".to_string()],
                included_checked_bags_only: true,
            },
            validating_airline_codes: vec![CARRIER.to_string()],
            traveler_pricings: self.traveler_pricings(offer, passengers),
        }
    }

    fn traveler_pricings(&self, offer: &OfferDescriptor, passengers: &PassengerManifest) -> Vec<TravelerPricing> {
        let initial = fare_initial(&offer.fare_type);
        let bags = if offer.fare_type.eq_ignore_ascii_case("basic") { 0 } else { 1 };
        let cabin = offer.cabin.to_uppercase();

        let pricing = |traveler_id: usize, traveler_type: &str, amount: Decimal, basis_suffix: &str, bags: u32| {
            TravelerPricing {
                traveler_id: traveler_id.to_string(),
                fare_option: "STANDARD".to_string(),
                traveler_type: traveler_type.to_string(),
                price: TravelerPrice {
                    currency: offer.currency.clone(),
                    total: amount.to_string(),
                    base: amount.to_string(),
                },
                fare_details_by_segment: vec![FareDetails {
                    segment_id: "1".to_string(),
                    cabin: cabin.clone(),
                    fare_basis: format!("{}{}", initial, basis_suffix),
                    class: initial.clone(),
                    included_checked_bags: CheckedBags { quantity: bags },
                }],
                associated_adult_id: None,
            }
        };

        let mut pricings = Vec::with_capacity(passengers.iter().count());
        let mut next_id = 1;
        for _ in &passengers.adults {
            pricings.push(pricing(next_id, "ADULT", offer.fares.adult, "BAS", bags));
            next_id += 1;
        }
        for _ in &passengers.children {
            pricings.push(pricing(next_id, "CHILD", offer.fares.child, "BAS", bags));
            next_id += 1;
        }
        for _ in &passengers.infants {
            // Infants travel on the first adult's lap, without checked bags
            let mut infant = pricing(next_id, "INFANT", offer.fares.infant, "INF", 0);
            infant.associated_adult_id = Some("1".to_string());
            pricings.push(infant);
            next_id += 1;
        }
        pricings
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new("AeroBook")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fare::FareCalculator;
    use rust_decimal_macros::dec;

    fn family() -> PassengerManifest {
        PassengerManifest {
            adults: vec![
                Passenger {
                    document: Some("X1234567".to_string()),
                    ..Passenger::new("Ana", "Diaz", PassengerType::Adult)
                },
                Passenger::new("Luis", "Diaz", PassengerType::Adult),
            ],
            children: vec![Passenger {
                age: Some(8),
                ..Passenger::new("Leo", "Diaz", PassengerType::Child)
            }],
            infants: vec![Passenger {
                age: Some(1),
                ..Passenger::new("Eva", "Diaz", PassengerType::Infant)
            }],
        }
    }

    fn contact() -> Contact {
        Contact {
            email: "a@b.com".to_string(),
            phone: "+34 600 000 000".to_string(),
        }
    }

    fn offer(flight_id: &str, fare_type: &str, passengers: &PassengerManifest) -> OfferDescriptor {
        let calc = FareCalculator::default();
        OfferDescriptor {
            flight_id: flight_id.to_string(),
            fare_type: fare_type.to_string(),
            cabin: "economy".to_string(),
            currency: "EUR".to_string(),
            service_fee: dec!(10),
            total_price: dec!(260),
            fares: calc.breakdown(dec!(250), passengers.counts()),
        }
    }

    #[test]
    fn test_split_route() {
        assert_eq!(split_route("MAD-JFK"), ("MAD".to_string(), "JFK".to_string()));
        assert_eq!(split_route("mad-jfk"), ("MAD".to_string(), "JFK".to_string()));
        assert_eq!(split_route("MADJFK"), ("LAX".to_string(), "GDL".to_string()));
        assert_eq!(split_route("MAD-"), ("MAD".to_string(), "GDL".to_string()));
        assert_eq!(split_route("-JFK"), ("LAX".to_string(), "JFK".to_string()));
        assert_eq!(split_route("MAD-JFK-1234"), ("MAD".to_string(), "JFK".to_string()));
    }

    #[test]
    fn test_travelers_are_numbered_adults_children_infants() {
        let passengers = family();
        let payload = PayloadBuilder::default()
            .build(&offer("MAD-JFK", "flex", &passengers), &passengers, &contact())
            .unwrap();
        let travelers = &payload.data.travelers;

        let ids: Vec<&str> = travelers.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(travelers[0].name.first_name, "Ana");
        assert_eq!(travelers[2].date_of_birth, "2010-01-01");
        assert_eq!(travelers[3].date_of_birth, "2023-01-01");

        assert_eq!(travelers[0].documents[0].number, "X1234567");
        assert_eq!(travelers[1].documents[0].number, "DUMMY123");
        assert!(travelers[2].documents.is_empty());
        assert!(travelers[3].documents.is_empty());

        for t in travelers {
            assert_eq!(t.contact.email_address, "a@b.com");
            assert_eq!(t.contact.phones[0].number, "34600000000");
        }
    }

    #[test]
    fn test_pricings_and_fare_basis() {
        let passengers = family();
        let payload = PayloadBuilder::default()
            .build(&offer("MAD-JFK", "flex", &passengers), &passengers, &contact())
            .unwrap();
        let offer = &payload.data.flight_offers[0];

        assert_eq!(offer.number_of_bookable_seats, 3);
        assert_eq!(offer.price.total, "260");
        assert_eq!(offer.price.base, "250");

        let pricings = &offer.traveler_pricings;
        assert_eq!(pricings.len(), 4);
        assert_eq!(pricings[0].traveler_type, "ADULT");
        assert_eq!(pricings[2].traveler_type, "CHILD");
        assert_eq!(pricings[2].price.total, "187.50");
        assert_eq!(pricings[3].traveler_type, "INFANT");
        assert_eq!(pricings[3].price.total, "25.00");
        assert_eq!(pricings[3].associated_adult_id.as_deref(), Some("1"));
        assert_eq!(pricings[0].associated_adult_id, None);

        let adult = &pricings[0].fare_details_by_segment[0];
        assert_eq!(adult.fare_basis, "FBAS");
        assert_eq!(adult.class, "F");
        assert_eq!(adult.cabin, "ECONOMY");
        assert_eq!(adult.included_checked_bags.quantity, 1);

        let infant = &pricings[3].fare_details_by_segment[0];
        assert_eq!(infant.fare_basis, "FINF");
        assert_eq!(infant.included_checked_bags.quantity, 0);
    }

    #[test]
    fn test_basic_fare_has_no_checked_bags() {
        let passengers = family();
        let payload = PayloadBuilder::default()
            .build(&offer("MAD-JFK", "basic", &passengers), &passengers, &contact())
            .unwrap();
        let pricings = &payload.data.flight_offers[0].traveler_pricings;
        assert_eq!(pricings[0].fare_details_by_segment[0].fare_basis, "BBAS");
        assert!(pricings
            .iter()
            .all(|p| p.fare_details_by_segment[0].included_checked_bags.quantity == 0));
    }

    #[test]
    fn test_missing_route_uses_placeholders() {
        let passengers = family();
        let payload = PayloadBuilder::default()
            .build(&offer("UNKNOWN", "basic", &passengers), &passengers, &contact())
            .unwrap();
        let segment = &payload.data.flight_offers[0].itineraries[0].segments[0];
        assert_eq!(segment.departure.iata_code, "LAX");
        assert_eq!(segment.arrival.iata_code, "GDL");
    }

    #[test]
    fn test_building_twice_gives_identical_payloads() {
        let passengers = family();
        let builder = PayloadBuilder::new("Acme Travel");
        let descriptor = offer("MAD-JFK", "flex", &passengers);
        let first = builder.build(&descriptor, &passengers, &contact()).unwrap();
        let second = builder.build(&descriptor, &passengers, &contact()).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.data.contacts[0].company_name, "Acme Travel");
        assert_eq!(first.data.contacts[0].addressee_name.first_name, "Ana");
    }

    #[test]
    fn test_wire_shape() {
        let passengers = family();
        let payload = PayloadBuilder::default()
            .build(&offer("MAD-JFK", "flex", &passengers), &passengers, &contact())
            .unwrap();
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["data"]["type"], "flight-order");
        assert_eq!(json["data"]["flightOffers"][0]["itineraries"][0]["segments"][0]["blacklistedInEU"], false);
        assert_eq!(json["data"]["flightOffers"][0]["travelerPricings"][3]["associatedAdultId"], "1");
        assert!(json["data"]["flightOffers"][0]["travelerPricings"][0].get("associatedAdultId").is_none());
        assert_eq!(json["data"]["ticketingAgreement"]["delay"], "6D");
        assert!(json["data"]["travelers"][2].get("documents").is_none());
    }

    #[test]
    fn test_zero_price_fails_the_build() {
        let passengers = family();
        let mut descriptor = offer("MAD-JFK", "flex", &passengers);
        descriptor.fares.adult = Decimal::ZERO;
        let err = PayloadBuilder::default()
            .build(&descriptor, &passengers, &contact())
            .unwrap_err();
        assert_eq!(err, PayloadError::NonPositiveFare("0".to_string()));
    }

    #[test]
    fn test_no_adults_fails_the_build() {
        let passengers = PassengerManifest {
            infants: vec![Passenger::new("Eva", "Diaz", PassengerType::Infant)],
            ..Default::default()
        };
        let descriptor = offer("MAD-JFK", "flex", &passengers);
        let err = PayloadBuilder::default()
            .build(&descriptor, &passengers, &contact())
            .unwrap_err();
        assert_eq!(err, PayloadError::NoAdults);
    }
}
