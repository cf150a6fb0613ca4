//! Client data form filler

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ContactDefaults;
use crate::driver::Driver;
use crate::error::{DriverError, DriverResult};
use crate::settle::ActionClass;
use crate::surface::{UiSurface, INPUT_EMAIL, INPUT_NAME, INPUT_PHONE};

/// Contact details typed into the client data step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContactData {
    phone: String,
    name: String,
    email: Option<String>,
}

impl ClientContactData {
    /// Phone and name are required; an empty email counts as absent.
    pub fn new(
        phone: impl Into<String>,
        name: impl Into<String>,
        email: Option<String>,
    ) -> DriverResult<Self> {
        let phone = phone.into();
        let name = name.into();

        if phone.trim().is_empty() {
            return Err(DriverError::InvalidContactData("phone must not be empty".to_string()));
        }
        if name.trim().is_empty() {
            return Err(DriverError::InvalidContactData("name must not be empty".to_string()));
        }

        Ok(Self {
            phone,
            name,
            email: email.filter(|e| !e.trim().is_empty()),
        })
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl TryFrom<&ContactDefaults> for ClientContactData {
    type Error = DriverError;

    fn try_from(defaults: &ContactDefaults) -> DriverResult<Self> {
        Self::new(&defaults.phone, &defaults.name, defaults.email.clone())
    }
}

/// What happened to one input of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFill {
    Filled,
    /// Field was read-only (pre-populated by the customer lookup)
    LeftReadOnly,
    /// No value supplied for an optional field
    NotRequested,
}

/// Per-field outcome of [`Driver::fill_client_contact_data`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFillReport {
    pub phone: FieldFill,
    pub name: FieldFill,
    pub email: FieldFill,
}

impl<S: UiSurface> Driver<S> {
    /// Fill the client data step.
    ///
    /// The phone is typed first and the customer lookup it triggers is given
    /// its settle delay. Name and email are then filled only if writable at
    /// that moment; a returning customer's fields come back read-only.
    pub async fn fill_client_contact_data(
        &mut self,
        data: &ClientContactData,
    ) -> DriverResult<FormFillReport> {
        self.wait_visible(INPUT_PHONE).await?;
        debug!("Filling {}", INPUT_PHONE);
        self.surface_mut().fill(INPUT_PHONE, data.phone()).await?;
        self.settle(ActionClass::ContactLookup).await;

        let name = self.fill_if_writable(INPUT_NAME, data.name()).await?;

        let email = match data.email() {
            Some(email) => self.fill_if_writable(INPUT_EMAIL, email).await?,
            None => FieldFill::NotRequested,
        };

        self.settle(ActionClass::FormFill).await;

        let report = FormFillReport {
            phone: FieldFill::Filled,
            name,
            email,
        };
        info!("Client data filled: {:?}", report);
        Ok(report)
    }

    /// Fill a single input, bypassing the read-only check
    pub async fn fill_field(&mut self, test_id: &str, value: &str) -> DriverResult<()> {
        self.wait_visible(test_id).await?;
        debug!("Filling {}", test_id);
        self.surface_mut().fill(test_id, value).await
    }

    /// Fill `test_id` unless it carries the read-only attribute.
    ///
    /// Writability is checked right before the fill, never cached.
    pub async fn fill_if_writable(&mut self, test_id: &str, value: &str) -> DriverResult<FieldFill> {
        self.wait_visible(test_id).await?;

        if self.surface_mut().is_read_only(test_id).await? {
            warn!("'{}' is read-only, keeping pre-populated value", test_id);
            return Ok(FieldFill::LeftReadOnly);
        }

        debug!("Filling {}", test_id);
        self.surface_mut().fill(test_id, value).await?;
        Ok(FieldFill::Filled)
    }
}
