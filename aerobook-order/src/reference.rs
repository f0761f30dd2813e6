use aerobook_core::{BookingError, BookingRepository};
use rand::Rng;
use tracing::{debug, warn};

/// Uppercase letters and digits without the look-alikes I, O, 0 and 1.
pub const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const REFERENCE_LENGTH: usize = 6;

/// Draws one candidate code; no uniqueness check.
pub fn draw_reference<R: Rng>(rng: &mut R) -> String {
    (0..REFERENCE_LENGTH)
        .map(|_| REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect()
}

/// True when `code` could have been issued by this generator.
pub fn is_local_reference(code: &str) -> bool {
    code.len() == REFERENCE_LENGTH && code.bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
}

/// Issues reference codes that are free in the booking store at the time of
/// the check. The store's unique constraint still has the last word: a code
/// can be taken between the check and the insert.
#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    max_attempts: u32,
}

impl ReferenceGenerator {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub async fn generate(&self, repo: &dyn BookingRepository) -> Result<String, BookingError> {
        let mut collisions = 0;
        while collisions < self.max_attempts {
            // ThreadRng is not Send, keep it out of the await below
            let candidate = draw_reference(&mut rand::thread_rng());
            let taken = repo
                .reference_exists(&candidate)
                .await
                .map_err(BookingError::persistence)?;
            if !taken {
                if collisions > 0 {
                    debug!(collisions, "Reference code issued after collisions");
                }
                return Ok(candidate);
            }
            collisions += 1;
        }
        warn!(attempts = self.max_attempts, "Reference code space exhausted");
        Err(BookingError::ReferenceSpaceExhausted(self.max_attempts))
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aerobook_core::repository::RepositoryError;
    use aerobook_core::Booking;
    use aerobook_store::InMemoryBookingRepository;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_excludes_ambiguous_glyphs() {
        for glyph in [b'I', b'O', b'0', b'1'] {
            assert!(!REFERENCE_ALPHABET.contains(&glyph));
        }
        let unique: HashSet<_> = REFERENCE_ALPHABET.iter().collect();
        assert_eq!(unique.len(), REFERENCE_ALPHABET.len());
    }

    #[test]
    fn test_drawn_codes_are_six_alphabet_symbols() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let code = draw_reference(&mut rng);
            assert_eq!(code.len(), 6);
            assert!(is_local_reference(&code), "{}", code);
            assert!(!code.contains(['I', 'O', '0', '1']));
        }
    }

    #[test]
    fn test_provider_codes_are_not_local() {
        assert!(!is_local_reference("XYZ123"));
        assert!(!is_local_reference("ABC23"));
        assert!(is_local_reference("ABC234"));
    }

    #[tokio::test]
    async fn test_generated_code_avoids_existing_references() {
        let repo = InMemoryBookingRepository::new();
        let mut existing = HashSet::new();
        let mut rng = StdRng::seed_from_u64(42);
        while existing.len() < 199 {
            let code = draw_reference(&mut rng);
            if existing.insert(code.clone()) {
                repo.insert_booking(&fixture(&code)).await.unwrap();
            }
        }

        let generator = ReferenceGenerator::new(16);
        let code = generator.generate(&repo).await.unwrap();
        assert!(!existing.contains(&code));
        assert!(is_local_reference(&code));
    }

    struct EverythingTaken;

    #[async_trait]
    impl BookingRepository for EverythingTaken {
        async fn reference_exists(&self, _pnr: &str) -> Result<bool, RepositoryError> {
            Ok(true)
        }
        async fn insert_booking(&self, _booking: &Booking) -> Result<(), RepositoryError> {
            unreachable!()
        }
        async fn find_by_reference(&self, _pnr: &str) -> Result<Option<Booking>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_bounded_retries_end_in_exhaustion() {
        let err = ReferenceGenerator::new(3).generate(&EverythingTaken).await.unwrap_err();
        assert!(matches!(err, BookingError::ReferenceSpaceExhausted(3)));
    }

    fn fixture(pnr: &str) -> Booking {
        use aerobook_core::{BookingStatus, Passenger, PassengerManifest, PassengerType};
        use rust_decimal_macros::dec;

        Booking {
            id: uuid::Uuid::new_v4(),
            pnr: pnr.to_string(),
            flight_id: "MAD-JFK".to_string(),
            fare_type: "basic".to_string(),
            fare_price: dec!(100),
            currency: "EUR".to_string(),
            service_fee: None,
            service_fee_currency: "EUR".to_string(),
            total_price: dec!(100),
            contact_email: "a@b.com".to_string(),
            contact_phone: "+34600000000".to_string(),
            adults: 1,
            children: 0,
            infants: 0,
            passengers: PassengerManifest {
                adults: vec![Passenger::new("Ana", "Diaz", PassengerType::Adult)],
                ..Default::default()
            },
            provider_order_id: None,
            status: BookingStatus::Confirmed,
            created_at: chrono::Utc::now(),
        }
    }
}
