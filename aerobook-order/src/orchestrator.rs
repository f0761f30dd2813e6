use aerobook_core::rates::FixedUsdRate;
use aerobook_core::repository::{BookingRepository, RepositoryError};
use aerobook_core::{
    is_well_formed_pnr, Booking, BookingError, BookingResult, BookingStatus, OrderProvider,
    ProviderConfirmation,
};
use aerobook_shared::{redact_email, redact_phone};
use aerobook_store::app_config::BookingRules;
use chrono::Utc;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::fallback::{BookingOutcome, Decision, FallbackConfig, FallbackEngine};
use crate::fare::FareCalculator;
use crate::models::{BookingConfirmation, NewBooking};
use crate::payload::{OfferDescriptor, PayloadBuilder};
use crate::reference::ReferenceGenerator;

/// Trimmed, upper-cased reference code; empty input is rejected.
pub fn normalize_reference(raw: &str) -> BookingResult<String> {
    let code = raw.trim().to_uppercase();
    if code.is_empty() {
        return Err(BookingError::Validation("reference code is required".to_string()));
    }
    Ok(code)
}

/// How the final row was sourced, which decides what may change on a
/// reference collision at insert time.
struct Provenance {
    /// The reference was drawn locally and can be redrawn.
    local_reference: bool,
    /// The order id embeds the reference (`FL-...`) and follows it.
    synthetic_order_id: bool,
    confirmation: Option<ProviderConfirmation>,
}

/// Attaches the provider-side order to a persistence failure so the caller
/// can reconcile.
fn with_provider(err: BookingError, confirmation: &Option<ProviderConfirmation>) -> BookingError {
    match err {
        BookingError::Persistence { source, provider: None } => BookingError::Persistence {
            source,
            provider: confirmation.clone(),
        },
        other => other,
    }
}

/// No free reference code is left. When the provider already holds the
/// order this is a storage failure carrying it, so the order can be
/// reconciled.
fn exhausted(
    attempts: u32,
    last_code: String,
    confirmation: Option<ProviderConfirmation>,
) -> BookingError {
    match confirmation {
        Some(confirmation) => {
            error!(
                attempts,
                provider_order_id = %confirmation.order_id,
                "Reference codes exhausted after provider confirmation"
            );
            BookingError::Persistence {
                source: RepositoryError::DuplicateReference(last_code),
                provider: Some(confirmation),
            }
        }
        None => BookingError::ReferenceSpaceExhausted(attempts),
    }
}

/// Runs one booking attempt end to end: total, reference, payload, provider
/// call, fallback decision, then exactly one insert.
pub struct BookingOrchestrator {
    bookings: Arc<dyn BookingRepository>,
    provider: Arc<dyn OrderProvider>,
    fares: FareCalculator,
    references: ReferenceGenerator,
    payloads: PayloadBuilder,
    fallback: FallbackEngine,
    default_cabin: String,
}

impl BookingOrchestrator {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        provider: Arc<dyn OrderProvider>,
        fallback: FallbackConfig,
    ) -> Self {
        Self {
            bookings,
            provider,
            fares: FareCalculator::default(),
            references: ReferenceGenerator::default(),
            payloads: PayloadBuilder::default(),
            fallback: FallbackEngine::new(fallback),
            default_cabin: "ECONOMY".to_string(),
        }
    }

    /// Wires every component from the `[booking]` configuration section.
    pub fn from_rules(
        bookings: Arc<dyn BookingRepository>,
        provider: Arc<dyn OrderProvider>,
        rules: &BookingRules,
    ) -> Result<Self, rust_decimal::Error> {
        let usd_rate = Decimal::from_str(rules.usd_fee_rate.trim())?;
        Ok(Self::new(bookings, provider, FallbackConfig::from_rules(rules))
            .with_fare_calculator(FareCalculator::new(Arc::new(FixedUsdRate::new(usd_rate))))
            .with_reference_generator(ReferenceGenerator::new(rules.max_reference_attempts))
            .with_payload_builder(PayloadBuilder::new(rules.agency_name.clone()))
            .with_default_cabin(rules.default_cabin.clone()))
    }

    pub fn with_fare_calculator(mut self, fares: FareCalculator) -> Self {
        self.fares = fares;
        self
    }

    pub fn with_reference_generator(mut self, references: ReferenceGenerator) -> Self {
        self.references = references;
        self
    }

    pub fn with_payload_builder(mut self, payloads: PayloadBuilder) -> Self {
        self.payloads = payloads;
        self
    }

    pub fn with_default_cabin(mut self, cabin: impl Into<String>) -> Self {
        self.default_cabin = cabin.into();
        self
    }

    pub fn fallback(&self) -> &FallbackEngine {
        &self.fallback
    }

    /// Creates one booking. A row is written only when the attempt ends
    /// confirmed, by the provider or by fallback.
    pub async fn create_booking(&self, request: NewBooking) -> BookingResult<BookingConfirmation> {
        request.validate()?;

        let currency = request.currency.trim().to_uppercase();
        let fee = request.service_fee_amount();
        let fee_currency = request.service_fee_currency();
        let total_price = self.fares.compute_total(request.fare_price, &currency, fee, &fee_currency);
        let contact = request.contact();

        info!(
            flight_id = %request.flight_id,
            fare_type = %request.fare_type,
            total = %total_price,
            currency = %currency,
            email = %redact_email(&contact.email),
            phone = %redact_phone(&contact.phone),
            "Creating booking"
        );

        let local_reference = self.references.generate(self.bookings.as_ref()).await?;

        let decision = if self.fallback.test_mode() {
            self.fallback.test_mode_decision()
        } else {
            let offer = OfferDescriptor {
                flight_id: request.flight_id.trim().to_string(),
                fare_type: request.fare_type.trim().to_string(),
                cabin: request
                    .travel_class
                    .clone()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| self.default_cabin.clone()),
                currency: currency.clone(),
                service_fee: fee,
                total_price,
                fares: self.fares.breakdown(request.fare_price, request.passengers.counts()),
            };
            let payload = self
                .payloads
                .build(&offer, &request.passengers, &contact)
                .map_err(|e| BookingError::Validation(e.to_string()))?;

            info!(transition = "attempting", local_reference = %local_reference, "Booking state transition");
            self.fallback.decide(self.provider.submit_order(&payload).await)
        };

        let outcome = decision.outcome();
        let created_at = Utc::now();

        let (pnr, provider_order_id, provider_message, provenance) = match decision {
            Decision::Confirmed(confirmation) => {
                // Provider code wins; an empty or malformed one leaves the local draw in place
                let provider_reference = confirmation.reference.trim().to_uppercase();
                let (pnr, local) = if is_well_formed_pnr(&provider_reference) {
                    (provider_reference, false)
                } else {
                    warn!(
                        provider_order_id = %confirmation.order_id,
                        provider_reference = %confirmation.reference,
                        local_reference = %local_reference,
                        "Provider reference unusable, keeping local code"
                    );
                    (local_reference, true)
                };
                (
                    pnr,
                    Some(confirmation.order_id.clone()),
                    None,
                    Provenance {
                        local_reference: local,
                        synthetic_order_id: false,
                        confirmation: Some(confirmation),
                    },
                )
            }
            Decision::Fallback { message, .. } => {
                let pnr = if self.fallback.test_mode() {
                    local_reference
                } else {
                    self.references.generate(self.bookings.as_ref()).await?
                };
                let order_id = FallbackEngine::synthesize_order_id(&pnr, created_at);
                (
                    pnr,
                    Some(order_id),
                    message,
                    Provenance {
                        local_reference: true,
                        synthetic_order_id: true,
                        confirmation: None,
                    },
                )
            }
            Decision::Failed(err) => return Err(err),
        };

        let booking = Booking {
            id: Uuid::new_v4(),
            pnr,
            flight_id: request.flight_id.trim().to_string(),
            fare_type: request.fare_type.trim().to_string(),
            fare_price: request.fare_price,
            currency,
            service_fee: request.service_fee,
            service_fee_currency: fee_currency,
            total_price,
            contact_email: contact.email,
            contact_phone: contact.phone,
            adults: request.adults,
            children: request.children,
            infants: request.infants,
            passengers: request.passengers,
            provider_order_id,
            status: BookingStatus::Confirmed,
            created_at,
        };
        booking.check_invariants().map_err(BookingError::Validation)?;

        let booking = self.persist(booking, provenance).await?;

        info!(
            pnr = %booking.pnr,
            booking_id = %booking.id,
            provider_order_id = ?booking.provider_order_id,
            outcome = ?outcome,
            "Booking stored"
        );

        Ok(BookingConfirmation {
            booking,
            outcome: outcome.unwrap_or(BookingOutcome::Confirmed),
            provider_message,
        })
    }

    /// Single insert with bounded redraws when a locally drawn reference
    /// loses a race. Provider-issued references are never redrawn.
    async fn persist(&self, mut booking: Booking, provenance: Provenance) -> BookingResult<Booking> {
        let mut collisions = 0u32;
        loop {
            match self.bookings.insert_booking(&booking).await {
                Ok(()) => return Ok(booking),
                Err(RepositoryError::DuplicateReference(code)) if provenance.local_reference => {
                    collisions += 1;
                    warn!(pnr = %code, collisions, "Reference code taken at insert, drawing another");
                    if collisions >= self.references.max_attempts() {
                        return Err(exhausted(collisions, code, provenance.confirmation));
                    }
                    booking.pnr = match self.references.generate(self.bookings.as_ref()).await {
                        Ok(pnr) => pnr,
                        Err(BookingError::ReferenceSpaceExhausted(attempts)) => {
                            return Err(exhausted(collisions + attempts, code, provenance.confirmation));
                        }
                        Err(e) => return Err(with_provider(e, &provenance.confirmation)),
                    };
                    if provenance.synthetic_order_id {
                        booking.provider_order_id =
                            Some(FallbackEngine::synthesize_order_id(&booking.pnr, booking.created_at));
                    }
                }
                Err(source) => {
                    error!(
                        pnr = %booking.pnr,
                        provider_order_id = ?booking.provider_order_id,
                        error = %source,
                        "Booking could not be stored"
                    );
                    return Err(BookingError::Persistence {
                        source,
                        provider: provenance.confirmation,
                    });
                }
            }
        }
    }

    pub async fn find_booking(&self, reference: &str) -> BookingResult<Booking> {
        let pnr = normalize_reference(reference)?;
        let found = self
            .bookings
            .find_by_reference(&pnr)
            .await
            .map_err(BookingError::persistence)?;
        found.ok_or(BookingError::NotFound(pnr))
    }
}
