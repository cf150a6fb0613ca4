//! Navigation gate around the forward and back controls

use tracing::{debug, info, warn};

use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::settle::ActionClass;
use crate::surface::{UiSurface, BUTTON_ADVANCE, BUTTON_BACK};

impl<S: UiSurface> Driver<S> {
    /// Move forward one step.
    ///
    /// The forward control must be visible and become enabled within the
    /// visibility timeout; clicking a disabled control is never attempted and
    /// surfaces as `GuardViolation`.
    pub async fn advance(&mut self) -> DriverResult<()> {
        self.wait_visible(BUTTON_ADVANCE).await?;

        let timeout = self.waits().visibility_timeout();
        if !self.wait_enabled_within(BUTTON_ADVANCE, timeout).await? {
            return Err(DriverError::GuardViolation {
                control: BUTTON_ADVANCE.to_string(),
                reason: "forward navigation is disabled".to_string(),
            });
        }

        debug!("Clicking {}", BUTTON_ADVANCE);
        self.surface_mut().click(BUTTON_ADVANCE).await?;
        self.settle(ActionClass::ForwardNavigation).await;
        info!("Advanced");
        Ok(())
    }

    /// Move back one step. The back control is assumed enabled when present.
    pub async fn back(&mut self) -> DriverResult<()> {
        self.wait_visible(BUTTON_BACK).await?;

        debug!("Clicking {}", BUTTON_BACK);
        self.surface_mut().click(BUTTON_BACK).await?;
        self.settle(ActionClass::BackwardNavigation).await;
        info!("Went back");
        Ok(())
    }

    /// Whether the forward control is enabled right now (single read)
    pub async fn advance_enabled(&mut self) -> DriverResult<bool> {
        self.wait_visible(BUTTON_ADVANCE).await?;
        self.surface_mut().is_enabled(BUTTON_ADVANCE).await
    }

    /// Whether the forward control is labelled with the confirmation keyword
    /// rather than plain "advance". Read from the UI on every call.
    pub async fn is_at_terminal_step(&mut self) -> DriverResult<bool> {
        self.wait_visible(BUTTON_ADVANCE).await?;
        let label = self
            .surface_mut()
            .text_content(BUTTON_ADVANCE)
            .await?
            .unwrap_or_default();
        Ok(label.contains(self.confirm_keyword()))
    }

    /// Validation-failure probe.
    ///
    /// Waits out one settle delay of `after` and reads the forward control
    /// exactly once. `true` means the input was rejected: the control is
    /// still disabled.
    pub async fn rejected_after_settle(&mut self, after: ActionClass) -> DriverResult<bool> {
        self.settle(after).await;
        let enabled = self.advance_enabled().await?;
        if enabled {
            warn!("Forward navigation enabled after {:?}; input was accepted", after);
        } else {
            info!("Forward navigation still disabled after {:?}", after);
        }
        Ok(!enabled)
    }
}
