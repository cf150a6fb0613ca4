//! Driver handle owning one UI session

use tracing::info;

use crate::app::booking_path;
use crate::config::DriverConfig;
use crate::error::DriverResult;
use crate::settle::{ActionClass, SettlePolicy};
use crate::surface::UiSurface;
use crate::wait::WaitConfig;

/// Drives the booking wizard through an exclusively owned [`UiSurface`].
///
/// The step operations live in `select`, `nav` and `form`; the driver itself
/// only carries the session and the timing policy. It keeps no notion of the
/// current step: that is always read back from the UI.
pub struct Driver<S> {
    surface: S,
    settle: SettlePolicy,
    waits: WaitConfig,
    confirm_keyword: String,
}

impl<S: UiSurface> Driver<S> {
    pub fn new(surface: S, config: &DriverConfig) -> Self {
        Self {
            surface,
            settle: config.settle.clone(),
            waits: config.waits.clone(),
            confirm_keyword: config.confirm_keyword.clone(),
        }
    }

    /// Navigate to the booking page of `tenant`
    pub async fn open_booking(&mut self, tenant: &str) -> DriverResult<()> {
        let path = booking_path(tenant);
        info!("Opening booking page {}", path);
        self.surface.goto(&path).await
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn waits(&self) -> &WaitConfig {
        &self.waits
    }

    pub fn settle_policy(&self) -> &SettlePolicy {
        &self.settle
    }

    pub fn confirm_keyword(&self) -> &str {
        &self.confirm_keyword
    }

    pub(crate) async fn settle(&self, class: ActionClass) {
        self.settle.settle(class).await;
    }

    /// Close the underlying session
    pub async fn close(mut self) -> DriverResult<()> {
        self.surface.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockWizard, MockWizardConfig};

    #[tokio::test]
    async fn test_open_booking_navigates_to_tenant_page() {
        let mut driver = Driver::new(MockWizard::new(MockWizardConfig::default()), &DriverConfig::default());
        driver.open_booking("demo").await.unwrap();

        let url = driver.surface_mut().current_url().await.unwrap();
        assert_eq!(url, "http://mock.local/demo/agendar");
    }

    #[test]
    fn test_driver_takes_timing_from_config() {
        let waits = WaitConfig {
            visibility_timeout_ms: 1,
            slot_timeout_ms: 2,
            poll_interval_ms: 3,
        };
        let config = DriverConfig {
            settle: SettlePolicy::immediate(),
            waits: waits.clone(),
            ..Default::default()
        };
        let driver = Driver::new(MockWizard::new(MockWizardConfig::default()), &config);

        assert_eq!(driver.settle_policy(), &SettlePolicy::immediate());
        assert_eq!(driver.waits(), &waits);
        assert_eq!(driver.confirm_keyword(), "Confirmar");
        assert!(driver.into_surface().interactions().is_empty());
    }
}
