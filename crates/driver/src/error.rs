//! Error types for the booking driver

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Element not found: '{test_id}' did not become visible within {timeout_ms} ms")]
    ElementNotFound { test_id: String, timeout_ms: u64 },

    #[error("Guard violation on '{control}': {reason}")]
    GuardViolation { control: String, reason: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Invalid contact data: {0}")]
    InvalidContactData(String),

    #[error("Invalid transition: cannot {action} at step {from}")]
    InvalidTransition { from: String, action: String },

    #[error("Playwright not found. Install with: npx playwright install")]
    BridgeNotFound,

    #[error("Playwright bridge error: {0}")]
    Bridge(String),

    #[error("Playwright bridge closed unexpectedly")]
    BridgeClosed,

    #[error("Application at {url} unreachable after {attempts} attempts")]
    AppUnreachable { url: String, attempts: usize },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DriverError {
    pub(crate) fn not_found(test_id: impl Into<String>, timeout: std::time::Duration) -> Self {
        DriverError::ElementNotFound {
            test_id: test_id.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    /// True for failures caused by the target UI rather than by the harness.
    pub fn is_ui_failure(&self) -> bool {
        matches!(
            self,
            DriverError::ElementNotFound { .. }
                | DriverError::GuardViolation { .. }
                | DriverError::AssertionFailed(_)
        )
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ui_failures_are_distinguished_from_harness_errors() {
        assert!(DriverError::not_found("button-avancar", Duration::from_secs(10)).is_ui_failure());
        assert!(DriverError::AssertionFailed("label".to_string()).is_ui_failure());
        assert!(!DriverError::BridgeClosed.is_ui_failure());
        assert!(!DriverError::Config("tenant".to_string()).is_ui_failure());
    }

    #[test]
    fn test_not_found_message() {
        let err = DriverError::not_found("time-button-*", Duration::from_millis(10_000));
        assert_eq!(
            err.to_string(),
            "Element not found: 'time-button-*' did not become visible within 10000 ms"
        );
    }
}
