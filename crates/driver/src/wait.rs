//! Bounded, condition-based waits
//!
//! Every wait polls the surface until a predicate holds or the timeout
//! elapses. There is no unbounded blocking anywhere in the driver.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::surface::{Category, UiSurface};

/// Upper bound for any single wait, in milliseconds
pub const MAX_WAIT_MS: u64 = 3_600_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Default visibility wait for controls and cards
    pub visibility_timeout_ms: u64,

    /// Wait for the time-slot collection after a date is selected
    pub slot_timeout_ms: u64,

    /// Delay between two polls
    pub poll_interval_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_ms: 10_000,
            slot_timeout_ms: 10_000,
            poll_interval_ms: 100,
        }
    }
}

impl WaitConfig {
    pub fn visibility_timeout(&self) -> Duration {
        Duration::from_millis(self.visibility_timeout_ms.min(MAX_WAIT_MS))
    }

    pub fn slot_timeout(&self) -> Duration {
        Duration::from_millis(self.slot_timeout_ms.min(MAX_WAIT_MS))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.clamp(1, MAX_WAIT_MS))
    }

    /// Timeout for the candidate collection of `category` to appear
    pub fn candidates_timeout(&self, category: Category) -> Duration {
        match category {
            Category::Time => self.slot_timeout(),
            _ => self.visibility_timeout(),
        }
    }
}

/// Deadline `timeout` from now, capped at [`MAX_WAIT_MS`]
fn deadline_after(timeout: Duration) -> Instant {
    Instant::now() + timeout.min(Duration::from_millis(MAX_WAIT_MS))
}

impl<S: UiSurface> Driver<S> {
    /// Wait until `test_id` is visible, within the default visibility timeout
    pub async fn wait_visible(&mut self, test_id: &str) -> DriverResult<()> {
        let timeout = self.waits().visibility_timeout();
        self.wait_visible_within(test_id, timeout).await
    }

    /// Wait until `test_id` is visible, failing with `ElementNotFound`
    pub async fn wait_visible_within(&mut self, test_id: &str, timeout: Duration) -> DriverResult<()> {
        let interval = self.waits().poll_interval();
        let deadline = deadline_after(timeout);

        loop {
            if self.surface_mut().is_visible(test_id).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                debug!("Gave up waiting for '{}'", test_id);
                return Err(DriverError::not_found(test_id, timeout));
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Wait until `test_id` reports enabled, within `timeout`.
    ///
    /// Returns whether it became enabled; the caller decides what a
    /// still-disabled control means.
    pub async fn wait_enabled_within(&mut self, test_id: &str, timeout: Duration) -> DriverResult<bool> {
        let interval = self.waits().poll_interval();
        let deadline = deadline_after(timeout);

        loop {
            if self.surface_mut().is_enabled(test_id).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                debug!("'{}' still disabled after {} ms", test_id, timeout.as_millis());
                return Ok(false);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Wait for at least one candidate of `category` to be rendered.
    ///
    /// Returns the number of candidates found, which is zero when none
    /// appeared before the category's timeout.
    pub async fn wait_for_candidates(&mut self, category: Category) -> DriverResult<usize> {
        let timeout = self.waits().candidates_timeout(category);
        let interval = self.waits().poll_interval();
        let deadline = deadline_after(timeout);

        loop {
            let count = self.surface_mut().count_prefixed(category.prefix()).await?;
            if count > 0 || Instant::now() >= deadline {
                return Ok(count);
            }
            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_timeout_per_category() {
        let waits = WaitConfig {
            visibility_timeout_ms: 5_000,
            slot_timeout_ms: 12_000,
            poll_interval_ms: 50,
        };
        assert_eq!(waits.candidates_timeout(Category::Time), Duration::from_secs(12));
        assert_eq!(waits.candidates_timeout(Category::Service), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let waits = WaitConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(waits.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_oversized_timeouts_are_capped() {
        let waits = WaitConfig {
            visibility_timeout_ms: u64::MAX,
            slot_timeout_ms: u64::MAX,
            poll_interval_ms: u64::MAX,
        };
        let cap = Duration::from_millis(MAX_WAIT_MS);
        assert_eq!(waits.visibility_timeout(), cap);
        assert_eq!(waits.candidates_timeout(Category::Time), cap);
        assert_eq!(waits.poll_interval(), cap);
        assert!(std::time::Instant::now().checked_add(cap).is_some());
    }
}
