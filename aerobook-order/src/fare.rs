use aerobook_core::rates::{FixedUsdRate, RateLookup};
use aerobook_core::PassengerCounts;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

/// Child fares are 75% of the adult fare.
pub const CHILD_FARE_RATIO: Decimal = Decimal::from_parts(75, 0, 0, false, 2);
/// Infant fares are 10% of the adult fare.
pub const INFANT_FARE_RATIO: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Per-passenger-type prices. Informational only: they go into the provider
/// payload, never into the persisted total.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct FareBreakdown {
    pub adult: Decimal,
    pub child: Decimal,
    pub infant: Decimal,
    pub counts: PassengerCounts,
}

impl FareBreakdown {
    pub fn subtotal(&self) -> Decimal {
        self.adult * Decimal::from(self.counts.adults)
            + self.child * Decimal::from(self.counts.children)
            + self.infant * Decimal::from(self.counts.infants)
    }
}

pub struct FareCalculator {
    rates: Arc<dyn RateLookup>,
}

impl FareCalculator {
    pub fn new(rates: Arc<dyn RateLookup>) -> Self {
        Self { rates }
    }

    /// Fare plus service fee, the fee converted into the fare currency when
    /// the rate lookup knows the pair. Unknown pairs are added unconverted.
    pub fn compute_total(
        &self,
        fare_price: Decimal,
        fare_currency: &str,
        service_fee: Decimal,
        service_fee_currency: &str,
    ) -> Decimal {
        if service_fee.is_zero() {
            return fare_price.round_dp(2);
        }

        let fee = if service_fee_currency.eq_ignore_ascii_case(fare_currency) {
            service_fee
        } else {
            match self.rates.rate(service_fee_currency, fare_currency) {
                Some(rate) => service_fee * rate,
                None => service_fee,
            }
        };

        (fare_price + fee).round_dp(2)
    }

    pub fn breakdown(&self, adult_fare: Decimal, counts: PassengerCounts) -> FareBreakdown {
        FareBreakdown {
            adult: adult_fare,
            child: (adult_fare * CHILD_FARE_RATIO).round_dp(2),
            infant: (adult_fare * INFANT_FARE_RATIO).round_dp(2),
            counts,
        }
    }
}

impl Default for FareCalculator {
    fn default() -> Self {
        Self::new(Arc::new(FixedUsdRate::default()))
    }
}
