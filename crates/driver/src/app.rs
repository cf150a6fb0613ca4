//! Readiness probe for the target booking application

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{DriverError, DriverResult};

/// Poll `url` until it answers with a success status
pub async fn wait_for_app(url: &str, timeout_duration: Duration) -> DriverResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    while start.elapsed() < timeout_duration {
        attempts += 1;

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Application is up at {}", url);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Readiness probe returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for application at {}...", url);
                }
                // Connection refused is expected while the dev server starts
                if !e.is_connect() {
                    warn!("Readiness probe error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(250)).await;
    }

    Err(DriverError::AppUnreachable {
        url: url.to_string(),
        attempts,
    })
}

/// Path of the booking page of `tenant`, relative to the application root
pub fn booking_path(tenant: &str) -> String {
    format!("/{}/agendar", tenant)
}

/// Absolute URL of the booking page of `tenant`
pub fn booking_url(base_url: &str, tenant: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), booking_path(tenant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_path() {
        assert_eq!(booking_path("demo"), "/demo/agendar");
    }

    #[test]
    fn test_booking_url() {
        assert_eq!(
            booking_url("http://localhost:5173/", "demo"),
            "http://localhost:5173/demo/agendar"
        );
    }

    #[tokio::test]
    async fn test_unreachable_app_times_out() {
        // Port 9 (discard) is not expected to serve HTTP locally
        let err = wait_for_app("http://127.0.0.1:9/", Duration::from_millis(300))
            .await
            .unwrap_err();
        match err {
            DriverError::AppUnreachable { attempts, .. } => assert!(attempts >= 1),
            other => panic!("unexpected error: {}", other),
        }
    }
}
