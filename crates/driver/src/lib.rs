//! Booking Wizard Flow Driver
//!
//! This crate drives and verifies the multi-step booking wizard of the
//! scheduling web application:
//! - Models the wizard as an ordered sequence of steps with conditional elision
//! - Selects the first (or a specific) option of each category
//! - Gates forward navigation on the enablement reported by the UI
//! - Synchronizes with asynchronous re-renders through a centralized settle policy
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    BookingFlow (orchestrator)               │
//! │    Service → Professional → [Location] → DateTime →         │
//! │    ClientInfo → Confirmation                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver<S: UiSurface>                                       │
//! │    ├── select_first_of / select_specific   (select.rs)      │
//! │    ├── advance / back / is_at_terminal_step (nav.rs)        │
//! │    ├── fill_client_contact_data            (form.rs)        │
//! │    └── wait_visible / wait_for_candidates  (wait.rs)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SettlePolicy (settle.rs)                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UiSurface                                                  │
//! │    ├── PlaywrightSurface (node bridge, JSON lines)          │
//! │    └── MockWizard (in-memory wizard)                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod config;
pub mod driver;
pub mod error;
pub mod flow;
pub mod form;
pub mod mock;
pub mod nav;
pub mod playwright;
pub mod runner;
pub mod scenarios;
pub mod select;
pub mod settle;
pub mod surface;
pub mod wait;

pub use config::DriverConfig;
pub use driver::Driver;
pub use error::{DriverError, DriverResult};
pub use flow::{BookingFlow, FlowResult, Step};
pub use form::ClientContactData;
pub use runner::ScenarioRunner;
pub use select::SelectionToken;
pub use settle::{ActionClass, SettlePolicy};
pub use surface::{Category, SurfaceFactory, UiSurface};
