//! Settle-wait policy
//!
//! The booking application gives no explicit "render finished" signal, so
//! every UI-mutating interaction is followed by a delay chosen by its action
//! class. All delays are resolved here; step logic only names the class.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of UI-mutating interaction, keyed by expected re-render cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionClass {
    /// Service, professional or location card
    CategorySelection,
    /// Date button; triggers the dependent time-slot fetch
    DateSelection,
    TimeSelection,
    ForwardNavigation,
    /// Customer lookup triggered by entering a phone number
    ContactLookup,
    BackwardNavigation,
    /// Trailing wait after the client data form is filled
    FormFill,
}

/// Delay table, in milliseconds, per action class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlePolicy {
    pub category_selection_ms: u64,
    pub date_selection_ms: u64,
    pub time_selection_ms: u64,
    pub forward_navigation_ms: u64,
    pub contact_lookup_ms: u64,
    pub backward_navigation_ms: u64,
    pub form_fill_ms: u64,
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            category_selection_ms: 500,
            date_selection_ms: 1000,
            time_selection_ms: 500,
            forward_navigation_ms: 1000,
            contact_lookup_ms: 2000,
            backward_navigation_ms: 500,
            form_fill_ms: 500,
        }
    }
}

impl SettlePolicy {
    /// No delays at all; for backends that render synchronously
    pub fn immediate() -> Self {
        Self {
            category_selection_ms: 0,
            date_selection_ms: 0,
            time_selection_ms: 0,
            forward_navigation_ms: 0,
            contact_lookup_ms: 0,
            backward_navigation_ms: 0,
            form_fill_ms: 0,
        }
    }

    /// Multiply every delay by `factor` (e.g. 2.0 on slow CI machines)
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |ms: u64| (ms as f64 * factor.max(0.0)).round() as u64;
        Self {
            category_selection_ms: scale(self.category_selection_ms),
            date_selection_ms: scale(self.date_selection_ms),
            time_selection_ms: scale(self.time_selection_ms),
            forward_navigation_ms: scale(self.forward_navigation_ms),
            contact_lookup_ms: scale(self.contact_lookup_ms),
            backward_navigation_ms: scale(self.backward_navigation_ms),
            form_fill_ms: scale(self.form_fill_ms),
        }
    }

    pub fn delay(&self, class: ActionClass) -> Duration {
        let ms = match class {
            ActionClass::CategorySelection => self.category_selection_ms,
            ActionClass::DateSelection => self.date_selection_ms,
            ActionClass::TimeSelection => self.time_selection_ms,
            ActionClass::ForwardNavigation => self.forward_navigation_ms,
            ActionClass::ContactLookup => self.contact_lookup_ms,
            ActionClass::BackwardNavigation => self.backward_navigation_ms,
            ActionClass::FormFill => self.form_fill_ms,
        };
        Duration::from_millis(ms)
    }

    /// Wait out the re-render that follows an action of `class`
    pub async fn settle(&self, class: ActionClass) {
        let delay = self.delay(class);
        if delay.is_zero() {
            return;
        }
        debug!("Settling {:?} for {} ms", class, delay.as_millis());
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let policy = SettlePolicy::default();
        assert_eq!(policy.delay(ActionClass::CategorySelection), Duration::from_millis(500));
        assert_eq!(policy.delay(ActionClass::DateSelection), Duration::from_millis(1000));
        assert_eq!(policy.delay(ActionClass::TimeSelection), Duration::from_millis(500));
        assert_eq!(policy.delay(ActionClass::ForwardNavigation), Duration::from_millis(1000));
        assert_eq!(policy.delay(ActionClass::ContactLookup), Duration::from_millis(2000));
        assert_eq!(policy.delay(ActionClass::BackwardNavigation), Duration::from_millis(500));
    }

    #[test]
    fn test_scaled_policy() {
        let policy = SettlePolicy::default().scaled(2.0);
        assert_eq!(policy.contact_lookup_ms, 4000);
        assert_eq!(SettlePolicy::default().scaled(-1.0), SettlePolicy::immediate());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let policy: SettlePolicy = toml::from_str("contact_lookup_ms = 3000").unwrap();
        assert_eq!(policy.contact_lookup_ms, 3000);
        assert_eq!(policy.forward_navigation_ms, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_sleeps_for_class_delay() {
        let start = tokio::time::Instant::now();
        SettlePolicy::default().settle(ActionClass::ContactLookup).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(2000));
        assert!(elapsed < Duration::from_millis(2100));
    }
}
