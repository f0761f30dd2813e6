//! Fallback decision engine.
//!
//! `ATTEMPTING -> {CONFIRMED, CONFIRMED_FALLBACK, FAILED}`. A provider
//! rejection whose code is on the allow-list becomes a locally issued
//! confirmation; any other rejection or transport failure ends the attempt.

use aerobook_core::{
    BookingError, ProviderConfirmation, ProviderRejection, ProviderResult, TransportError,
};
use aerobook_store::app_config::BookingRules;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{error, info, warn};

const PRODUCTION_FALLBACK_MESSAGE: &str =
    "Booking created in fallback mode due to a temporary system limitation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl Environment {
    /// Unknown tags read as development.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a successful booking was confirmed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingOutcome {
    Confirmed,
    ConfirmedFallback,
}

/// Engine switches, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackConfig {
    pub environment: Environment,
    pub test_mode: bool,
    pub auto_fallback: bool,
    pub eligible_codes: BTreeSet<String>,
    pub show_messages: bool,
}

impl FallbackConfig {
    pub fn from_rules(rules: &BookingRules) -> Self {
        Self {
            environment: Environment::from_tag(&rules.environment),
            test_mode: rules.test_mode,
            auto_fallback: rules.auto_fallback,
            eligible_codes: rules
                .fallback_error_codes
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            show_messages: rules.show_fallback_messages,
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self::from_rules(&BookingRules::default())
    }
}

/// Terminal state of one attempt.
#[derive(Debug)]
pub enum Decision {
    Confirmed(ProviderConfirmation),
    /// Confirm locally. `error_code` is the absorbed rejection, `None` in test mode.
    Fallback {
        error_code: Option<String>,
        message: Option<String>,
    },
    Failed(BookingError),
}

impl Decision {
    pub fn outcome(&self) -> Option<BookingOutcome> {
        match self {
            Decision::Confirmed(_) => Some(BookingOutcome::Confirmed),
            Decision::Fallback { .. } => Some(BookingOutcome::ConfirmedFallback),
            Decision::Failed(_) => None,
        }
    }
}

pub struct FallbackEngine {
    config: FallbackConfig,
}

impl FallbackEngine {
    pub fn new(config: FallbackConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FallbackConfig {
        &self.config
    }

    pub fn test_mode(&self) -> bool {
        self.config.test_mode
    }

    /// Short-circuit taken before any network call when test mode is on.
    pub fn test_mode_decision(&self) -> Decision {
        info!(transition = "confirmed_fallback", reason = "test_mode", "Booking state transition");
        Decision::Fallback {
            error_code: None,
            message: None,
        }
    }

    pub fn is_eligible(&self, rejection: &ProviderRejection) -> bool {
        self.config.auto_fallback
            && rejection
                .error_code
                .as_deref()
                .map(|code| self.config.eligible_codes.contains(code.trim()))
                .unwrap_or(false)
    }

    /// Resolves a provider call into a terminal state.
    pub fn decide(&self, result: Result<ProviderResult, TransportError>) -> Decision {
        match result {
            Ok(ProviderResult::Confirmed(confirmation)) => {
                info!(
                    transition = "confirmed",
                    provider_order_id = %confirmation.order_id,
                    provider_reference = %confirmation.reference,
                    "Booking state transition"
                );
                Decision::Confirmed(confirmation)
            }
            Ok(ProviderResult::Rejected(rejection)) if self.is_eligible(&rejection) => {
                warn!(
                    transition = "confirmed_fallback",
                    error_code = ?rejection.error_code,
                    error_title = ?rejection.error_title,
                    status = rejection.status,
                    "Booking state transition"
                );
                Decision::Fallback {
                    message: self.fallback_message(rejection.error_code.as_deref()),
                    error_code: rejection.error_code,
                }
            }
            Ok(ProviderResult::Rejected(rejection)) => {
                error!(
                    transition = "failed",
                    error_code = ?rejection.error_code,
                    error_title = ?rejection.error_title,
                    status = rejection.status,
                    "Booking state transition"
                );
                Decision::Failed(BookingError::ProviderRejected {
                    message: rejection.failure_message(),
                    rejection,
                })
            }
            Err(err) => {
                error!(transition = "failed", error = %err, "Booking state transition");
                Decision::Failed(BookingError::Transport(err))
            }
        }
    }

    /// Informational text attached to a fallback confirmation, if shown at all.
    pub fn fallback_message(&self, error_code: Option<&str>) -> Option<String> {
        if !self.config.show_messages {
            return None;
        }
        let message = match self.config.environment {
            Environment::Production => PRODUCTION_FALLBACK_MESSAGE.to_string(),
            _ => format!(
                "Booking created in test mode because the segment is not available for real sale (Error {}).",
                error_code.unwrap_or("unknown")
            ),
        };
        Some(message)
    }

    /// `FL-{code}-{unix seconds}`
    pub fn synthesize_order_id(reference: &str, at: DateTime<Utc>) -> String {
        format!("FL-{}-{}", reference, at.timestamp())
    }
}
