//! Scenario catalogue
//!
//! Each scenario exercises one behaviour of the booking wizard on a fresh
//! session. A scenario passes, is skipped when the tenant's data makes it
//! inapplicable, or fails with the error that aborted it.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::booking_path;
use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::flow::{run_booking, BookingFlow, Step};
use crate::form::{ClientContactData, FieldFill};
use crate::settle::ActionClass;
use crate::surface::{Category, UiSurface, BUTTON_ADVANCE, INPUT_NAME, INPUT_PHONE};

/// Phone rejected by the application's format rules
pub const INVALID_PHONE: &str = "123";
/// Name below the application's minimum length
pub const SHORT_NAME: &str = "Jo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    PageLoads,
    ServiceAdvancesToProfessionals,
    BackReturnsToServices,
    DateLoadsTimeSlots,
    FillsClientData,
    CompletesBookingFlow,
    AdvanceDisabledInitially,
    RejectsInvalidPhone,
    RejectsShortName,
}

/// Inputs shared by every scenario of a suite
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub tenant: String,
    pub contact: ClientContactData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Skipped(String),
}

impl Scenario {
    pub const ALL: [Scenario; 9] = [
        Scenario::PageLoads,
        Scenario::ServiceAdvancesToProfessionals,
        Scenario::BackReturnsToServices,
        Scenario::DateLoadsTimeSlots,
        Scenario::FillsClientData,
        Scenario::CompletesBookingFlow,
        Scenario::AdvanceDisabledInitially,
        Scenario::RejectsInvalidPhone,
        Scenario::RejectsShortName,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::PageLoads => "page-loads",
            Scenario::ServiceAdvancesToProfessionals => "service-advances-to-professionals",
            Scenario::BackReturnsToServices => "back-returns-to-services",
            Scenario::DateLoadsTimeSlots => "date-loads-time-slots",
            Scenario::FillsClientData => "fills-client-data",
            Scenario::CompletesBookingFlow => "completes-booking-flow",
            Scenario::AdvanceDisabledInitially => "advance-disabled-initially",
            Scenario::RejectsInvalidPhone => "rejects-invalid-phone",
            Scenario::RejectsShortName => "rejects-short-name",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::PageLoads => "booking page opens and lists services",
            Scenario::ServiceAdvancesToProfessionals => {
                "selecting a service enables advancing to professionals"
            }
            Scenario::BackReturnsToServices => "back control returns from professionals to services",
            Scenario::DateLoadsTimeSlots => "selecting a date loads its time slots",
            Scenario::FillsClientData => "client data step accepts phone and name",
            Scenario::CompletesBookingFlow => "canonical run reaches the confirmation control",
            Scenario::AdvanceDisabledInitially => "advance is disabled before any selection",
            Scenario::RejectsInvalidPhone => "malformed phone keeps advance disabled",
            Scenario::RejectsShortName => "name under three characters keeps advance disabled",
        }
    }

    pub fn tags(&self) -> &'static [&'static str] {
        match self {
            Scenario::PageLoads => &["smoke"],
            Scenario::ServiceAdvancesToProfessionals => &["smoke", "navigation"],
            Scenario::BackReturnsToServices => &["navigation"],
            Scenario::DateLoadsTimeSlots => &["navigation"],
            Scenario::FillsClientData => &["form"],
            Scenario::CompletesBookingFlow => &["flow", "smoke"],
            Scenario::AdvanceDisabledInitially => &["validation", "smoke"],
            Scenario::RejectsInvalidPhone => &["validation"],
            Scenario::RejectsShortName => &["validation"],
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    pub fn from_name(name: &str) -> Option<Scenario> {
        Scenario::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Run the scenario on a driver whose session has not been used yet
    pub async fn run<S: UiSurface>(
        &self,
        driver: &mut Driver<S>,
        ctx: &ScenarioContext,
    ) -> DriverResult<Verdict> {
        info!("Scenario {}: {}", self.name(), self.description());

        match self {
            Scenario::PageLoads => {
                driver.open_booking(&ctx.tenant).await?;
                let url = driver.surface_mut().current_url().await?;
                let expected = booking_path(&ctx.tenant);
                ensure(url.contains(&expected), || format!("URL '{}' lacks '{}'", url, expected))?;
                expect_candidate_visible(driver, Category::Service).await?;
            }

            Scenario::ServiceAdvancesToProfessionals => {
                driver.open_booking(&ctx.tenant).await?;
                driver.select_first_required(Category::Service).await?;
                ensure(driver.advance_enabled().await?, || {
                    "advance disabled after selecting a service".to_string()
                })?;
                driver.advance().await?;
                expect_candidate_visible(driver, Category::Professional).await?;
            }

            Scenario::BackReturnsToServices => {
                driver.open_booking(&ctx.tenant).await?;
                BookingFlow::new(driver).advance_to(Step::Professional).await?;
                expect_candidate_visible(driver, Category::Professional).await?;
                driver.back().await?;
                expect_candidate_visible(driver, Category::Service).await?;
            }

            Scenario::DateLoadsTimeSlots => {
                driver.open_booking(&ctx.tenant).await?;
                BookingFlow::new(driver).advance_to(Step::DateTime).await?;
                driver.select_first_required(Category::Date).await?;
                expect_candidate_visible(driver, Category::Time).await?;
            }

            Scenario::FillsClientData => {
                driver.open_booking(&ctx.tenant).await?;
                let mut flow = BookingFlow::new(driver);
                flow.advance_to(Step::ClientInfo).await?;
                flow.fill_client_info(&ctx.contact).await?;

                let phone = driver.surface_mut().input_value(INPUT_PHONE).await?;
                let prefix: String = ctx.contact.phone().chars().take(8).collect();
                ensure(phone.contains(&prefix), || {
                    format!("phone field holds '{}', expected it to contain '{}'", phone, prefix)
                })?;

                let name = driver.surface_mut().input_value(INPUT_NAME).await?;
                ensure(!name.is_empty(), || "name field is empty".to_string())?;
            }

            Scenario::CompletesBookingFlow => {
                let result = run_booking(driver, &ctx.tenant, &ctx.contact).await?;
                ensure(result.ready, || format!("flow not ready: {}", result.message))?;

                driver.wait_visible(BUTTON_ADVANCE).await?;
                ensure(driver.advance_enabled().await?, || {
                    "confirmation control is disabled".to_string()
                })?;

                let label = driver
                    .surface_mut()
                    .text_content(BUTTON_ADVANCE)
                    .await?
                    .unwrap_or_default();
                let keyword = driver.confirm_keyword().to_string();
                ensure(label.contains(&keyword), || {
                    format!("label '{}' lacks '{}'", label, keyword)
                })?;
            }

            Scenario::AdvanceDisabledInitially => {
                driver.open_booking(&ctx.tenant).await?;
                ensure(!driver.advance_enabled().await?, || {
                    "advance enabled before any selection".to_string()
                })?;
            }

            Scenario::RejectsInvalidPhone => {
                driver.open_booking(&ctx.tenant).await?;
                BookingFlow::new(driver).advance_to(Step::ClientInfo).await?;
                driver.fill_field(INPUT_PHONE, INVALID_PHONE).await?;
                let rejected = driver.rejected_after_settle(ActionClass::ContactLookup).await?;
                ensure(rejected, || format!("phone '{}' was accepted", INVALID_PHONE))?;
            }

            Scenario::RejectsShortName => {
                driver.open_booking(&ctx.tenant).await?;
                BookingFlow::new(driver).advance_to(Step::ClientInfo).await?;
                driver.fill_field(INPUT_PHONE, ctx.contact.phone()).await?;
                driver.settle(ActionClass::ContactLookup).await;

                if driver.fill_if_writable(INPUT_NAME, SHORT_NAME).await? == FieldFill::LeftReadOnly {
                    return Ok(Verdict::Skipped(
                        "name pre-populated by customer lookup".to_string(),
                    ));
                }
                let rejected = driver.rejected_after_settle(ActionClass::FormFill).await?;
                ensure(rejected, || format!("name '{}' was accepted", SHORT_NAME))?;
            }
        }

        Ok(Verdict::Passed)
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn ensure<F>(condition: bool, message: F) -> DriverResult<()>
where
    F: FnOnce() -> String,
{
    if condition {
        Ok(())
    } else {
        Err(DriverError::AssertionFailed(message()))
    }
}

/// At least one candidate of `category` is rendered and visible
async fn expect_candidate_visible<S: UiSurface>(
    driver: &mut Driver<S>,
    category: Category,
) -> DriverResult<()> {
    let timeout = driver.waits().candidates_timeout(category);
    if driver.wait_for_candidates(category).await? == 0 {
        return Err(DriverError::not_found(format!("{}*", category.prefix()), timeout));
    }
    let first = driver
        .surface_mut()
        .first_prefixed(category.prefix())
        .await?
        .ok_or_else(|| DriverError::not_found(format!("{}*", category.prefix()), timeout))?;
    driver.wait_visible_within(&first, timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_resolvable() {
        let names: HashSet<_> = Scenario::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), Scenario::ALL.len());
        for scenario in Scenario::ALL {
            assert_eq!(Scenario::from_name(scenario.name()), Some(scenario));
        }
        assert_eq!(Scenario::from_name("nope"), None);
    }

    #[test]
    fn test_smoke_tag() {
        let smoke: Vec<_> = Scenario::ALL.into_iter().filter(|s| s.has_tag("smoke")).collect();
        assert_eq!(
            smoke,
            vec![
                Scenario::PageLoads,
                Scenario::ServiceAdvancesToProfessionals,
                Scenario::CompletesBookingFlow,
                Scenario::AdvanceDisabledInitially,
            ]
        );
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&Scenario::RejectsShortName).unwrap();
        assert_eq!(json, "\"rejects-short-name\"");
    }
}
