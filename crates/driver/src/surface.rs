//! UI surface contract
//!
//! The driver never touches the DOM directly. Every interaction goes through
//! [`UiSurface`], addressed by the application's stable `data-testid` scheme.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverResult;

/// Phone input on the client data step
pub const INPUT_PHONE: &str = "input-telefone";
/// Name input on the client data step
pub const INPUT_NAME: &str = "input-nome";
/// Email input on the client data step
pub const INPUT_EMAIL: &str = "input-email";
/// Forward navigation control ("Avançar" / "Confirmar")
pub const BUTTON_ADVANCE: &str = "button-avancar";
/// Backward navigation control
pub const BUTTON_BACK: &str = "button-voltar";

/// A selectable group of the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Service,
    Professional,
    Location,
    Date,
    Time,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Service,
        Category::Professional,
        Category::Location,
        Category::Date,
        Category::Time,
    ];

    /// Identifier prefix shared by every candidate of this category
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Service => "service-card-",
            Category::Professional => "professional-card-",
            Category::Location => "location-card-",
            Category::Date => "date-button-",
            Category::Time => "time-button-",
        }
    }

    /// Test id of the candidate with the given item id
    pub fn test_id(&self, item_id: &str) -> String {
        format!("{}{}", self.prefix(), item_id)
    }

    /// Optional categories are counted once, without waiting for candidates.
    pub fn is_optional(&self) -> bool {
        matches!(self, Category::Location)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Service => "service",
            Category::Professional => "professional",
            Category::Location => "location",
            Category::Date => "date",
            Category::Time => "time",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One exclusively owned UI session of the target application.
///
/// Backends report state as it is right now; waiting and polling live in the
/// driver so every backend gets the same timeout semantics.
#[async_trait]
pub trait UiSurface: Send {
    /// Navigate to a path relative to the application base URL
    async fn goto(&mut self, path: &str) -> DriverResult<()>;

    /// URL currently displayed
    async fn current_url(&mut self) -> DriverResult<String>;

    /// Number of rendered elements whose test id starts with `prefix`
    async fn count_prefixed(&mut self, prefix: &str) -> DriverResult<usize>;

    /// Full test id of the first rendered element whose test id starts with
    /// `prefix`, in the UI's native ordering
    async fn first_prefixed(&mut self, prefix: &str) -> DriverResult<Option<String>>;

    async fn is_visible(&mut self, test_id: &str) -> DriverResult<bool>;

    async fn is_enabled(&mut self, test_id: &str) -> DriverResult<bool>;

    /// Whether the element carries the `readonly` attribute
    async fn is_read_only(&mut self, test_id: &str) -> DriverResult<bool>;

    async fn click(&mut self, test_id: &str) -> DriverResult<()>;

    async fn fill(&mut self, test_id: &str, value: &str) -> DriverResult<()>;

    async fn text_content(&mut self, test_id: &str) -> DriverResult<Option<String>>;

    async fn input_value(&mut self, test_id: &str) -> DriverResult<String>;

    /// Release the session. The surface must not be used afterwards.
    async fn close(&mut self) -> DriverResult<()> {
        Ok(())
    }
}

/// Opens a fresh surface for every run; nothing is shared between runs.
#[async_trait]
pub trait SurfaceFactory: Send + Sync {
    type Surface: UiSurface;

    async fn open(&self) -> DriverResult<Self::Surface>;
}
