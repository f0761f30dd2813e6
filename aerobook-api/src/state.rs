use aerobook_order::{BookingOrchestrator, ConfirmationNotifier};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub bookings: Arc<BookingOrchestrator>,
    pub notifier: Arc<ConfirmationNotifier>,
}
