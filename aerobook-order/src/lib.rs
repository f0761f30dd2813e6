pub mod fallback;
pub mod fare;
pub mod models;
pub mod notification;
pub mod orchestrator;
pub mod payload;
pub mod reference;

pub use fallback::{BookingOutcome, Decision, Environment, FallbackConfig, FallbackEngine};
pub use fare::{FareBreakdown, FareCalculator};
pub use models::{BookingConfirmation, NewBooking};
pub use notification::{ConfirmationNotifier, EmailReceipt, NotificationError};
pub use orchestrator::BookingOrchestrator;
pub use payload::{OfferDescriptor, PayloadBuilder, PayloadError};
pub use reference::ReferenceGenerator;
