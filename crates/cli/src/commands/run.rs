//! Canonical flow command

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;

use booking_driver::app::{booking_url, wait_for_app};
use booking_driver::flow::run_booking;
use booking_driver::mock::MockWizard;
use booking_driver::playwright::PlaywrightSurface;
use booking_driver::{ClientContactData, Driver, DriverConfig, DriverResult, FlowResult, UiSurface};

use super::{load_config, mock_wizard, TargetArgs};
use crate::output::{print_error, print_item, OutputFormat, TableDisplay};

#[derive(Serialize)]
pub struct FlowDisplay {
    pub url: String,
    pub ready: bool,
    pub slot: Option<NaiveDateTime>,
    pub message: String,
}

impl TableDisplay for FlowDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Booking page", "Ready", "Slot", "Message"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.url.clone(),
            if self.ready { "✓" } else { "✗" }.to_string(),
            self.slot
                .map(|s| s.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.message.clone(),
        ]
    }
}

pub async fn execute(target: &TargetArgs, format: OutputFormat) -> Result<bool> {
    let config = load_config(target)?;
    let contact = ClientContactData::try_from(&config.contact)?;

    let outcome = if target.mock {
        let driver = Driver::new(MockWizard::new(mock_wizard(&config)), &config);
        run_once(driver, &config, &contact).await
    } else {
        let timeout = Duration::from_millis(config.app_startup_timeout_ms);
        wait_for_app(&config.base_url, timeout).await?;
        let surface = PlaywrightSurface::launch(&config.base_url, &config.browser).await?;
        run_once(Driver::new(surface, &config), &config, &contact).await
    };

    let url = booking_url(&config.base_url, &config.tenant);
    match outcome {
        Ok(result) => {
            print_item(
                &FlowDisplay {
                    url,
                    ready: result.ready,
                    slot: result.slot,
                    message: result.message,
                },
                format,
            );
            Ok(result.ready)
        }
        Err(e) => {
            print_error(&format!("Booking flow failed at {}: {}", url, e));
            Ok(false)
        }
    }
}

async fn run_once<S: UiSurface>(
    mut driver: Driver<S>,
    config: &DriverConfig,
    contact: &ClientContactData,
) -> DriverResult<FlowResult> {
    let result = run_booking(&mut driver, &config.tenant, contact).await;
    if let Err(e) = driver.close().await {
        warn!("Closing session failed: {}", e);
    }
    result
}
