use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub provider: ProviderConfig,
    pub booking: BookingRules,
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

/// Flight distribution provider endpoints and credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub auth_url: String,
    pub orders_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Bounds the token exchange and the order call separately.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 { 20 }

/// Switches consumed by the booking engine. Read once at start-up.
#[derive(Debug, Deserialize, Clone)]
pub struct BookingRules {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub test_mode: bool,
    #[serde(default = "default_true")]
    pub auto_fallback: bool,
    #[serde(default = "default_fallback_codes")]
    pub fallback_error_codes: Vec<String>,
    #[serde(default = "default_true")]
    pub show_fallback_messages: bool,
    /// Decimal string, e.g. "0.92".
    #[serde(default = "default_usd_fee_rate")]
    pub usd_fee_rate: String,
    #[serde(default = "default_max_reference_attempts")]
    pub max_reference_attempts: u32,
    #[serde(default = "default_agency_name")]
    pub agency_name: String,
    #[serde(default = "default_cabin")]
    pub default_cabin: String,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            test_mode: false,
            auto_fallback: true,
            fallback_error_codes: default_fallback_codes(),
            show_fallback_messages: true,
            usd_fee_rate: default_usd_fee_rate(),
            max_reference_attempts: default_max_reference_attempts(),
            agency_name: default_agency_name(),
            default_cabin: default_cabin(),
        }
    }
}

fn default_true() -> bool { true }
fn default_environment() -> String { "development".into() }
fn default_fallback_codes() -> Vec<String> { vec!["34651".into()] }
fn default_usd_fee_rate() -> String { "0.92".into() }
fn default_max_reference_attempts() -> u32 { 16 }
fn default_agency_name() -> String { "AeroBook".into() }
fn default_cabin() -> String { "ECONOMY".into() }

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    pub from: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // AEROBOOK__BOOKING__TEST_MODE=true sets booking.test_mode
            .add_source(
                config::Environment::with_prefix("AEROBOOK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("booking.fallback_error_codes")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
