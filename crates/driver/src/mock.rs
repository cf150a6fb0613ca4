//! In-memory booking wizard
//!
//! Renders the same `data-testid` contract as the booking application and
//! applies the same enablement rules, synchronously. Used for rehearsing the
//! flow without a browser and throughout the test suite.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app;
use crate::error::{DriverError, DriverResult};
use crate::flow::Step;
use crate::surface::{
    Category, SurfaceFactory, UiSurface, BUTTON_ADVANCE, BUTTON_BACK, INPUT_EMAIL, INPUT_NAME,
    INPUT_PHONE,
};

const MOCK_ORIGIN: &str = "http://mock.local";

/// Customer already registered with the tenant; the phone lookup finds it
/// and locks the name (and email, when known)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownCustomer {
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockWizardConfig {
    pub tenant: String,
    pub services: Vec<String>,
    pub professionals: Vec<String>,
    /// Empty for single-location tenants: the location step is not shown
    pub locations: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// `HH:MM` slots offered for every date
    pub times: Vec<String>,
    /// Number of slot queries answered with "none yet" after a date click
    pub slot_latency_polls: u32,
    pub known_customers: Vec<KnownCustomer>,
    pub advance_label: String,
    pub confirm_label: String,
}

impl Default for MockWizardConfig {
    fn default() -> Self {
        Self {
            tenant: "demo".to_string(),
            services: vec!["corte".to_string(), "barba".to_string()],
            professionals: vec!["ana".to_string(), "bruno".to_string()],
            locations: vec!["centro".to_string(), "shopping".to_string()],
            dates: [(2026, 10, 19), (2026, 10, 20)]
                .into_iter()
                .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
                .collect(),
            times: vec!["09:00".to_string(), "09:30".to_string(), "10:00".to_string()],
            slot_latency_polls: 0,
            known_customers: vec![KnownCustomer {
                phone: "11988887777".to_string(),
                name: "Maria Cliente".to_string(),
                email: Some("maria@example.com".to_string()),
            }],
            advance_label: "Avançar".to_string(),
            confirm_label: "Confirmar agendamento".to_string(),
        }
    }
}

/// An interaction received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Goto(String),
    Click(String),
    Fill(String, String),
}

pub struct MockWizard {
    config: MockWizardConfig,
    path: String,
    /// `None` while the booking page is not displayed
    step: Option<Step>,
    service: Option<String>,
    professional: Option<String>,
    location: Option<String>,
    date: Option<String>,
    time: Option<String>,
    slot_polls_remaining: u32,
    phone: String,
    name: String,
    email: String,
    name_locked: bool,
    email_locked: bool,
    interactions: Vec<Interaction>,
    disabled_clicks: usize,
}

impl MockWizard {
    pub fn new(config: MockWizardConfig) -> Self {
        Self {
            config,
            path: "/".to_string(),
            step: None,
            service: None,
            professional: None,
            location: None,
            date: None,
            time: None,
            slot_polls_remaining: 0,
            phone: String::new(),
            name: String::new(),
            email: String::new(),
            name_locked: false,
            email_locked: false,
            interactions: Vec::new(),
            disabled_clicks: 0,
        }
    }

    /// Wizard step currently displayed
    pub fn step(&self) -> Option<Step> {
        self.step
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of clicks received by `test_id`
    pub fn clicks_on(&self, test_id: &str) -> usize {
        self.interactions
            .iter()
            .filter(|i| matches!(i, Interaction::Click(id) if id == test_id))
            .count()
    }

    /// Clicks that hit a disabled forward control
    pub fn disabled_clicks(&self) -> usize {
        self.disabled_clicks
    }

    pub fn selected(&self, category: Category) -> Option<&str> {
        match category {
            Category::Service => self.service.as_deref(),
            Category::Professional => self.professional.as_deref(),
            Category::Location => self.location.as_deref(),
            Category::Date => self.date.as_deref(),
            Category::Time => self.time.as_deref(),
        }
    }

    /// True once the confirmation control has been clicked
    pub fn confirmed(&self) -> bool {
        self.step == Some(Step::Confirmation)
    }

    fn booking_path(&self) -> String {
        app::booking_path(&self.config.tenant)
    }

    fn has_locations(&self) -> bool {
        !self.config.locations.is_empty()
    }

    fn next_step(&self, step: Step) -> Option<Step> {
        match step.next() {
            Some(Step::Location) if !self.has_locations() => Some(Step::DateTime),
            other => other,
        }
    }

    fn previous_step(&self, step: Step) -> Option<Step> {
        Step::ALL
            .iter()
            .rev()
            .copied()
            .find(|s| *s < step && (*s != Step::Location || self.has_locations()))
    }

    fn candidate_ids(&self, category: Category) -> Vec<String> {
        match category {
            Category::Service => self.config.services.clone(),
            Category::Professional => self.config.professionals.clone(),
            Category::Location => self.config.locations.clone(),
            Category::Date => self
                .config
                .dates
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect(),
            Category::Time => self.config.times.clone(),
        }
    }

    /// Test ids rendered right now, in document order
    fn rendered(&self) -> Vec<String> {
        let Some(step) = self.step else {
            return Vec::new();
        };

        let categories: &[Category] = match step {
            Step::Service => &[Category::Service],
            Step::Professional => &[Category::Professional],
            Step::Location => &[Category::Location],
            Step::DateTime if self.slots_loaded() => &[Category::Date, Category::Time],
            Step::DateTime => &[Category::Date],
            Step::ClientInfo | Step::Confirmation => &[],
        };

        let mut ids: Vec<String> = categories
            .iter()
            .flat_map(|c| {
                self.candidate_ids(*c)
                    .into_iter()
                    .map(move |id| c.test_id(&id))
            })
            .collect();

        if step == Step::ClientInfo {
            ids.extend([INPUT_PHONE, INPUT_NAME, INPUT_EMAIL].map(String::from));
        }
        if step != Step::Service {
            ids.push(BUTTON_BACK.to_string());
        }
        if step != Step::Confirmation {
            ids.push(BUTTON_ADVANCE.to_string());
        }
        ids
    }

    fn slots_loaded(&self) -> bool {
        self.date.is_some() && self.slot_polls_remaining == 0
    }

    fn advance_allowed(&self) -> bool {
        match self.step {
            Some(Step::Service) => self.service.is_some(),
            Some(Step::Professional) => self.professional.is_some(),
            Some(Step::Location) => self.location.is_some(),
            Some(Step::DateTime) => self.date.is_some() && self.time.is_some(),
            Some(Step::ClientInfo) => {
                valid_phone(&self.phone) && self.name.trim().chars().count() >= 3 && valid_email(&self.email)
            }
            Some(Step::Confirmation) | None => false,
        }
    }

    fn require_rendered(&self, test_id: &str) -> DriverResult<()> {
        if self.rendered().iter().any(|id| id == test_id) {
            Ok(())
        } else {
            Err(DriverError::Bridge(format!("'{}' is not rendered", test_id)))
        }
    }

    fn lookup_customer(&mut self) {
        let digits = digits_of(&self.phone);
        let found = self
            .config
            .known_customers
            .iter()
            .find(|c| digits_of(&c.phone) == digits)
            .cloned();

        match found {
            Some(customer) => {
                debug!("Mock lookup found customer for {}", self.phone);
                self.name = customer.name;
                self.name_locked = true;
                if let Some(email) = customer.email {
                    self.email = email;
                    self.email_locked = true;
                }
            }
            None => {
                self.name_locked = false;
                self.email_locked = false;
            }
        }
    }

    fn select_card(&mut self, test_id: &str) {
        let step = self.step;
        let pick = |category: Category| {
            test_id
                .strip_prefix(category.prefix())
                .map(String::from)
        };

        match step {
            Some(Step::Service) => self.service = pick(Category::Service),
            Some(Step::Professional) => self.professional = pick(Category::Professional),
            Some(Step::Location) => self.location = pick(Category::Location),
            Some(Step::DateTime) => {
                if let Some(date) = pick(Category::Date) {
                    self.date = Some(date);
                    self.time = None;
                    self.slot_polls_remaining = self.config.slot_latency_polls;
                } else if let Some(time) = pick(Category::Time) {
                    self.time = Some(time);
                }
            }
            _ => {}
        }
    }
}

fn digits_of(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Brazilian phone numbers: 10 or 11 digits, formatting ignored
fn valid_phone(value: &str) -> bool {
    let digits = digits_of(value);
    (10..=11).contains(&digits.len())
}

/// Empty (optional) or `local@domain.tld`
fn valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return true;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[async_trait]
impl UiSurface for MockWizard {
    async fn goto(&mut self, path: &str) -> DriverResult<()> {
        self.interactions.push(Interaction::Goto(path.to_string()));
        let config = self.config.clone();
        let interactions = std::mem::take(&mut self.interactions);
        *self = MockWizard::new(config);
        self.interactions = interactions;

        self.path = path.to_string();
        if path.trim_end_matches('/') == self.booking_path() {
            self.step = Some(Step::Service);
        }
        Ok(())
    }

    async fn current_url(&mut self) -> DriverResult<String> {
        Ok(format!("{}{}", MOCK_ORIGIN, self.path))
    }

    async fn count_prefixed(&mut self, prefix: &str) -> DriverResult<usize> {
        if prefix == Category::Time.prefix()
            && self.step == Some(Step::DateTime)
            && self.date.is_some()
            && self.slot_polls_remaining > 0
        {
            self.slot_polls_remaining -= 1;
            return Ok(0);
        }
        Ok(self.rendered().iter().filter(|id| id.starts_with(prefix)).count())
    }

    async fn first_prefixed(&mut self, prefix: &str) -> DriverResult<Option<String>> {
        Ok(self.rendered().into_iter().find(|id| id.starts_with(prefix)))
    }

    async fn is_visible(&mut self, test_id: &str) -> DriverResult<bool> {
        Ok(self.rendered().iter().any(|id| id == test_id))
    }

    async fn is_enabled(&mut self, test_id: &str) -> DriverResult<bool> {
        self.require_rendered(test_id)?;
        Ok(test_id != BUTTON_ADVANCE || self.advance_allowed())
    }

    async fn is_read_only(&mut self, test_id: &str) -> DriverResult<bool> {
        self.require_rendered(test_id)?;
        Ok(match test_id {
            INPUT_NAME => self.name_locked,
            INPUT_EMAIL => self.email_locked,
            _ => false,
        })
    }

    async fn click(&mut self, test_id: &str) -> DriverResult<()> {
        self.require_rendered(test_id)?;
        self.interactions.push(Interaction::Click(test_id.to_string()));

        let Some(step) = self.step else {
            return Ok(());
        };

        match test_id {
            BUTTON_ADVANCE => {
                if !self.advance_allowed() {
                    self.disabled_clicks += 1;
                    return Err(DriverError::Bridge(format!("'{}' is disabled", test_id)));
                }
                self.step = self.next_step(step);
            }
            BUTTON_BACK => {
                self.step = self.previous_step(step).or(Some(step));
            }
            _ => self.select_card(test_id),
        }
        Ok(())
    }

    async fn fill(&mut self, test_id: &str, value: &str) -> DriverResult<()> {
        self.require_rendered(test_id)?;
        self.interactions
            .push(Interaction::Fill(test_id.to_string(), value.to_string()));

        match test_id {
            INPUT_PHONE => {
                self.phone = value.to_string();
                self.lookup_customer();
            }
            INPUT_NAME if self.name_locked => {
                return Err(DriverError::Bridge(format!("'{}' is read-only", test_id)));
            }
            INPUT_NAME => self.name = value.to_string(),
            INPUT_EMAIL if self.email_locked => {
                return Err(DriverError::Bridge(format!("'{}' is read-only", test_id)));
            }
            INPUT_EMAIL => self.email = value.to_string(),
            _ => return Err(DriverError::Bridge(format!("'{}' is not an input", test_id))),
        }
        Ok(())
    }

    async fn text_content(&mut self, test_id: &str) -> DriverResult<Option<String>> {
        if !self.rendered().iter().any(|id| id == test_id) {
            return Ok(None);
        }
        let text = match test_id {
            BUTTON_ADVANCE if self.step == Some(Step::ClientInfo) => self.config.confirm_label.clone(),
            BUTTON_ADVANCE => self.config.advance_label.clone(),
            BUTTON_BACK => "Voltar".to_string(),
            other => other.to_string(),
        };
        Ok(Some(text))
    }

    async fn input_value(&mut self, test_id: &str) -> DriverResult<String> {
        self.require_rendered(test_id)?;
        match test_id {
            INPUT_PHONE => Ok(self.phone.clone()),
            INPUT_NAME => Ok(self.name.clone()),
            INPUT_EMAIL => Ok(self.email.clone()),
            _ => Err(DriverError::Bridge(format!("'{}' is not an input", test_id))),
        }
    }
}

/// Hands out a fresh [`MockWizard`] per run
#[derive(Debug, Clone, Default)]
pub struct MockFactory {
    pub config: MockWizardConfig,
}

impl MockFactory {
    pub fn new(config: MockWizardConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SurfaceFactory for MockFactory {
    type Surface = MockWizard;

    async fn open(&self) -> DriverResult<MockWizard> {
        Ok(MockWizard::new(self.config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_rule() {
        assert!(valid_phone("11999999999"));
        assert!(valid_phone("(11) 3333-4444"));
        assert!(!valid_phone("123"));
        assert!(!valid_phone("119999999999"));
    }

    #[test]
    fn test_email_rule() {
        assert!(valid_email(""));
        assert!(valid_email("joao.teste@example.com"));
        assert!(!valid_email("joao"));
        assert!(!valid_email("joao@localhost"));
    }

    #[tokio::test]
    async fn test_nothing_rendered_before_navigation() {
        let mut wizard = MockWizard::new(MockWizardConfig::default());
        assert_eq!(wizard.count_prefixed("service-card-").await.unwrap(), 0);
        assert!(!wizard.is_visible(BUTTON_ADVANCE).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_path_renders_nothing() {
        let mut wizard = MockWizard::new(MockWizardConfig::default());
        wizard.goto("/outro/agendar").await.unwrap();
        assert_eq!(wizard.step(), None);
        assert_eq!(wizard.current_url().await.unwrap(), "http://mock.local/outro/agendar");
    }

    #[tokio::test]
    async fn test_back_skips_missing_location_step() {
        let mut wizard = MockWizard::new(MockWizardConfig {
            locations: vec![],
            ..Default::default()
        });
        wizard.goto("/demo/agendar").await.unwrap();
        wizard.click("service-card-corte").await.unwrap();
        wizard.click(BUTTON_ADVANCE).await.unwrap();
        wizard.click("professional-card-ana").await.unwrap();
        wizard.click(BUTTON_ADVANCE).await.unwrap();
        assert_eq!(wizard.step(), Some(Step::DateTime));

        wizard.click(BUTTON_BACK).await.unwrap();
        assert_eq!(wizard.step(), Some(Step::Professional));
    }

    #[tokio::test]
    async fn test_disabled_advance_click_is_rejected() {
        let mut wizard = MockWizard::new(MockWizardConfig::default());
        wizard.goto("/demo/agendar").await.unwrap();
        assert!(wizard.click(BUTTON_ADVANCE).await.is_err());
        assert_eq!(wizard.disabled_clicks(), 1);
        assert_eq!(wizard.step(), Some(Step::Service));
    }
}
