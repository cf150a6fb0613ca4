//! Flow orchestrator
//!
//! Composes the step operations into the canonical end-to-end run:
//!
//! ```text
//! Service ─select, advance─► Professional ─select, advance─► Location?
//!   Location: select; advance only if a location was selected
//! DateTime ─select date, select time, advance─► ClientInfo ─fill─► Confirmation
//! ```
//!
//! Failures are not caught here; they propagate to the caller.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::form::{ClientContactData, FormFillReport};
use crate::select::{parse_date_token, parse_time_token, SelectionToken};
use crate::surface::{Category, UiSurface};

/// Wizard steps, in traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Service,
    Professional,
    /// Present only when the tenant has locations to choose from
    Location,
    DateTime,
    ClientInfo,
    Confirmation,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Service,
        Step::Professional,
        Step::Location,
        Step::DateTime,
        Step::ClientInfo,
        Step::Confirmation,
    ];

    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Service => Some(Step::Professional),
            Step::Professional => Some(Step::Location),
            Step::Location => Some(Step::DateTime),
            Step::DateTime => Some(Step::ClientInfo),
            Step::ClientInfo => Some(Step::Confirmation),
            Step::Confirmation => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Step::Location)
    }

    /// Category picked on this step, for single-category steps
    pub fn category(&self) -> Option<Category> {
        match self {
            Step::Service => Some(Category::Service),
            Step::Professional => Some(Category::Professional),
            Step::Location => Some(Category::Location),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Service => "service",
            Step::Professional => "professional",
            Step::Location => "location",
            Step::DateTime => "date_time",
            Step::ClientInfo => "client_info",
            Step::Confirmation => "confirmation",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a complete run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowResult {
    pub ready: bool,
    pub message: String,
    /// Appointment slot picked on the date/time step
    pub slot: Option<NaiveDateTime>,
}

impl FlowResult {
    fn completed(slot: Option<NaiveDateTime>) -> Self {
        Self {
            ready: true,
            message: "flow completed".to_string(),
            slot,
        }
    }
}

/// A token picked on a given step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub step: Step,
    pub category: Category,
    pub token: SelectionToken,
}

/// One end-to-end run over a driver.
///
/// `current` is bookkeeping only; terminal detection always reads the UI.
pub struct BookingFlow<'d, S> {
    driver: &'d mut Driver<S>,
    current: Step,
    selections: Vec<Selection>,
    elided: Vec<Step>,
}

impl<'d, S: UiSurface> BookingFlow<'d, S> {
    /// Start a run at the Service step. The booking page must already be open.
    pub fn new(driver: &'d mut Driver<S>) -> Self {
        Self {
            driver,
            current: Step::Service,
            selections: Vec::new(),
            elided: Vec::new(),
        }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Optional steps skipped because they had no candidates
    pub fn elided(&self) -> &[Step] {
        &self.elided
    }

    pub fn driver(&mut self) -> &mut Driver<S> {
        &mut *self.driver
    }

    /// Token chosen for `category`, if any
    pub fn selection(&self, category: Category) -> Option<&SelectionToken> {
        self.selections
            .iter()
            .find(|s| s.category == category)
            .map(|s| &s.token)
    }

    /// Date and time picked so far, when both tokens are well formed
    pub fn slot(&self) -> Option<NaiveDateTime> {
        let date = parse_date_token(self.selection(Category::Date)?)?;
        let time = parse_time_token(self.selection(Category::Time)?)?;
        Some(date.and_time(time))
    }

    /// Perform the current selection step and move to the next one
    pub async fn complete_selection_step(&mut self) -> DriverResult<Step> {
        match self.current {
            Step::Service | Step::Professional => {
                let category = self.current_category()?;
                self.select_required(category).await?;
                self.driver.advance().await?;
            }
            Step::Location => match self.driver.select_first_of(Category::Location).await? {
                Some(token) => {
                    self.record(Category::Location, token);
                    self.driver.advance().await?;
                }
                None => {
                    info!("No locations offered, skipping location step");
                    self.elided.push(Step::Location);
                }
            },
            Step::DateTime => {
                self.select_required(Category::Date).await?;
                self.select_required(Category::Time).await?;
                self.driver.advance().await?;
            }
            Step::ClientInfo | Step::Confirmation => {
                return Err(self.invalid("complete a selection step"));
            }
        }

        let from = self.current;
        self.current = from.next().unwrap_or(from);
        info!("Step {} done, now at {}", from, self.current);
        Ok(self.current)
    }

    /// Run selection steps until `target` is the current step
    pub async fn advance_to(&mut self, target: Step) -> DriverResult<()> {
        if target > Step::ClientInfo || target < self.current {
            return Err(self.invalid(&format!("advance to {}", target)));
        }
        while self.current < target {
            self.complete_selection_step().await?;
        }
        Ok(())
    }

    /// Fill the client data step. No forward navigation is performed.
    pub async fn fill_client_info(&mut self, data: &ClientContactData) -> DriverResult<FormFillReport> {
        if self.current != Step::ClientInfo {
            return Err(self.invalid("fill client data"));
        }
        self.driver.fill_client_contact_data(data).await
    }

    /// Assert the UI reports the terminal step and produce the result
    pub async fn finish(&mut self) -> DriverResult<FlowResult> {
        if self.current != Step::ClientInfo {
            return Err(self.invalid("finish"));
        }
        if !self.driver.is_at_terminal_step().await? {
            return Err(DriverError::AssertionFailed(format!(
                "forward control is not labelled '{}' after client data",
                self.driver.confirm_keyword()
            )));
        }
        self.current = Step::Confirmation;
        info!(
            "Booking flow reached confirmation ({} selections, {} elided)",
            self.selections.len(),
            self.elided.len()
        );
        Ok(FlowResult::completed(self.slot()))
    }

    /// The canonical end-to-end run
    pub async fn run(&mut self, data: &ClientContactData) -> DriverResult<FlowResult> {
        self.advance_to(Step::ClientInfo).await?;
        self.fill_client_info(data).await?;
        self.finish().await
    }

    async fn select_required(&mut self, category: Category) -> DriverResult<()> {
        let token = self.driver.select_first_required(category).await?;
        self.record(category, token);
        Ok(())
    }

    fn record(&mut self, category: Category, token: SelectionToken) {
        self.selections.push(Selection {
            step: self.current,
            category,
            token,
        });
    }

    fn current_category(&self) -> DriverResult<Category> {
        self.current
            .category()
            .ok_or_else(|| self.invalid("select a category"))
    }

    fn invalid(&self, action: &str) -> DriverError {
        DriverError::InvalidTransition {
            from: self.current.to_string(),
            action: action.to_string(),
        }
    }
}

/// Open the booking page and run the canonical flow on a fresh driver
pub async fn run_booking<S: UiSurface>(
    driver: &mut Driver<S>,
    tenant: &str,
    data: &ClientContactData,
) -> DriverResult<FlowResult> {
    driver.open_booking(tenant).await?;
    BookingFlow::new(driver).run(data).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_order() {
        let mut walked = vec![Step::Service];
        let mut step = Step::Service;
        while let Some(next) = step.next() {
            walked.push(next);
            step = next;
        }
        assert_eq!(walked, Step::ALL.to_vec());
        assert!(Step::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_only_location_is_optional() {
        assert_eq!(
            Step::ALL.iter().filter(|s| s.is_optional()).collect::<Vec<_>>(),
            vec![&Step::Location]
        );
    }
}
