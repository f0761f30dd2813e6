pub mod pii;

pub use pii::{redact_email, redact_phone, Masked};
