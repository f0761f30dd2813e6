use rust_decimal::Decimal;

/// Currency conversion used when a service fee is charged in a different
/// currency than the fare.
pub trait RateLookup: Send + Sync {
    /// Multiplier converting one unit of `from` into `to`, or `None` when the
    /// pair is unknown and the amount should be taken as is.
    fn rate(&self, from: &str, to: &str) -> Option<Decimal>;
}

/// Single hardcoded pair: USD fees into any non-USD fare currency.
#[derive(Debug, Clone)]
pub struct FixedUsdRate {
    pub usd_rate: Decimal,
}

impl FixedUsdRate {
    pub fn new(usd_rate: Decimal) -> Self {
        Self { usd_rate }
    }
}

impl Default for FixedUsdRate {
    fn default() -> Self {
        Self {
            usd_rate: Decimal::new(92, 2),
        }
    }
}

impl RateLookup for FixedUsdRate {
    fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if from.eq_ignore_ascii_case("USD") && !to.eq_ignore_ascii_case("USD") {
            Some(self.usd_rate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fixed_rate_only_knows_usd_source() {
        let rates = FixedUsdRate::default();
        assert_eq!(rates.rate("USD", "EUR"), Some(dec!(0.92)));
        assert_eq!(rates.rate("USD", "MXN"), Some(dec!(0.92)));
        assert_eq!(rates.rate("EUR", "USD"), None);
        assert_eq!(rates.rate("GBP", "EUR"), None);
        assert_eq!(rates.rate("USD", "USD"), None);
    }
}
