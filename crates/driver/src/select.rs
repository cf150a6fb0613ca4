//! Selection primitive shared by every wizard step

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::settle::ActionClass;
use crate::surface::{Category, UiSurface};

/// Opaque identifier of the entity chosen within a category.
///
/// Derived from the candidate's test id with the category prefix stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionToken(String);

impl SelectionToken {
    /// Derive the token from a rendered test id; `None` if the id does not
    /// belong to `category`.
    pub fn from_test_id(category: Category, test_id: &str) -> Option<Self> {
        test_id
            .strip_prefix(category.prefix())
            .filter(|rest| !rest.is_empty())
            .map(|rest| SelectionToken(rest.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SelectionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SelectionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn selection_class(category: Category) -> ActionClass {
    match category {
        Category::Service | Category::Professional | Category::Location => {
            ActionClass::CategorySelection
        }
        Category::Date => ActionClass::DateSelection,
        Category::Time => ActionClass::TimeSelection,
    }
}

impl<S: UiSurface> Driver<S> {
    /// Select the first candidate of `category` in the UI's native ordering.
    ///
    /// Returns `Ok(None)` when the category has no candidates. Optional
    /// categories are counted once, as rendered right now; required ones are
    /// given their bounded wait to appear first.
    pub async fn select_first_of(&mut self, category: Category) -> DriverResult<Option<SelectionToken>> {
        let count = if category.is_optional() {
            self.surface_mut().count_prefixed(category.prefix()).await?
        } else {
            self.wait_for_candidates(category).await?
        };

        if count == 0 {
            info!("No {} candidates rendered", category);
            return Ok(None);
        }

        let timeout = self.waits().visibility_timeout();
        let test_id = self
            .surface_mut()
            .first_prefixed(category.prefix())
            .await?
            .ok_or_else(|| DriverError::not_found(format!("{}*", category.prefix()), timeout))?;

        self.wait_visible(&test_id).await?;

        let token = SelectionToken::from_test_id(category, &test_id).ok_or_else(|| {
            DriverError::AssertionFailed(format!("'{}' is not a {} identifier", test_id, category))
        })?;

        debug!("Clicking {}", test_id);
        self.surface_mut().click(&test_id).await?;
        self.settle(selection_class(category)).await;

        info!("Selected {} '{}' ({} candidates)", category, token, count);
        Ok(Some(token))
    }

    /// Like [`Driver::select_first_of`], for categories that must not be empty
    pub async fn select_first_required(&mut self, category: Category) -> DriverResult<SelectionToken> {
        match self.select_first_of(category).await? {
            Some(token) => Ok(token),
            None => Err(DriverError::not_found(
                format!("{}*", category.prefix()),
                self.waits().candidates_timeout(category),
            )),
        }
    }

    /// Select the candidate of `category` identified by `id`
    pub async fn select_specific(&mut self, category: Category, id: &str) -> DriverResult<()> {
        let test_id = category.test_id(id);
        self.wait_visible(&test_id).await?;

        debug!("Clicking {}", test_id);
        self.surface_mut().click(&test_id).await?;
        self.settle(selection_class(category)).await;

        info!("Selected {} '{}'", category, id);
        Ok(())
    }

    /// Select a specific day; time slots for that day load afterwards
    pub async fn select_date(&mut self, date: NaiveDate) -> DriverResult<()> {
        self.select_specific(Category::Date, &date.format("%Y-%m-%d").to_string())
            .await
    }

    /// Select a specific time slot of the currently selected day
    pub async fn select_time(&mut self, time: NaiveTime) -> DriverResult<()> {
        self.select_specific(Category::Time, &time.format("%H:%M").to_string())
            .await
    }
}

/// Parse a date token (`YYYY-MM-DD`)
pub fn parse_date_token(token: &SelectionToken) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(token.as_str(), "%Y-%m-%d").ok()
}

/// Parse a time token (`HH:MM`)
pub fn parse_time_token(token: &SelectionToken) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(token.as_str(), "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Category::Service, "service-card-7", "7")]
    #[test_case(Category::Professional, "professional-card-ana", "ana")]
    #[test_case(Category::Location, "location-card-centro", "centro")]
    #[test_case(Category::Date, "date-button-2026-10-18", "2026-10-18")]
    #[test_case(Category::Time, "time-button-09:30", "09:30")]
    fn test_token_strips_category_prefix(category: Category, test_id: &str, expected: &str) {
        let token = SelectionToken::from_test_id(category, test_id).unwrap();
        assert_eq!(token.as_str(), expected);
    }

    #[test]
    fn test_token_rejects_foreign_ids() {
        assert!(SelectionToken::from_test_id(Category::Service, "professional-card-1").is_none());
        assert!(SelectionToken::from_test_id(Category::Service, "service-card-").is_none());
    }

    #[test]
    fn test_token_derivation_is_idempotent() {
        let a = SelectionToken::from_test_id(Category::Location, "location-card-9");
        let b = SelectionToken::from_test_id(Category::Location, "location-card-9");
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_date_and_time_tokens() {
        let date = SelectionToken::from_test_id(Category::Date, "date-button-2026-10-18").unwrap();
        assert_eq!(parse_date_token(&date), NaiveDate::from_ymd_opt(2026, 10, 18));

        let time = SelectionToken::from_test_id(Category::Time, "time-button-14:00").unwrap();
        assert_eq!(parse_time_token(&time), NaiveTime::from_hms_opt(14, 0, 0));
        assert_eq!(parse_time_token(&date), None);
    }
}
