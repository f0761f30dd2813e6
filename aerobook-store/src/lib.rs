pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod email_log_repo;
pub mod mailer;
pub mod memory;
pub mod provider_client;

pub use booking_repo::PostgresBookingRepository;
pub use database::DbClient;
pub use email_log_repo::PostgresEmailLogRepository;
pub use mailer::LogMailer;
pub use memory::{InMemoryBookingRepository, InMemoryEmailLogRepository};
pub use provider_client::HttpOrderProvider;
