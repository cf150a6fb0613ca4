//! Readiness check command

use std::time::Duration;

use anyhow::Result;

use booking_driver::app::{booking_url, wait_for_app};

use super::{load_config, TargetArgs};
use crate::output::{print_error, print_success};

pub async fn execute(target: &TargetArgs) -> Result<bool> {
    let config = load_config(target)?;

    if target.mock {
        print_success("In-memory wizard selected; no application to probe");
        return Ok(true);
    }

    let timeout = Duration::from_millis(config.app_startup_timeout_ms);
    match wait_for_app(&config.base_url, timeout).await {
        Ok(()) => {
            print_success(&format!(
                "Application is running; booking page at {}",
                booking_url(&config.base_url, &config.tenant)
            ));
            Ok(true)
        }
        Err(e) => {
            print_error(&e.to_string());
            Ok(false)
        }
    }
}
