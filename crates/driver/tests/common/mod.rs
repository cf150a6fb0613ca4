//! Shared helpers for driver integration tests

#![allow(dead_code)]

use booking_driver::mock::{MockWizard, MockWizardConfig};
use booking_driver::wait::WaitConfig;
use booking_driver::{ClientContactData, Driver, DriverConfig, SettlePolicy};

/// No settle delays and short waits: the mock renders synchronously
pub fn fast_config() -> DriverConfig {
    DriverConfig {
        settle: SettlePolicy::immediate(),
        waits: WaitConfig {
            visibility_timeout_ms: 50,
            slot_timeout_ms: 50,
            poll_interval_ms: 1,
        },
        ..Default::default()
    }
}

pub fn driver_with(config: MockWizardConfig) -> Driver<MockWizard> {
    Driver::new(MockWizard::new(config), &fast_config())
}

pub async fn opened(config: MockWizardConfig) -> Driver<MockWizard> {
    let mut driver = driver_with(config);
    driver.open_booking("demo").await.unwrap();
    driver
}

pub fn contact() -> ClientContactData {
    ClientContactData::new(
        "11999999999",
        "João da Silva Teste",
        Some("joao.teste@example.com".to_string()),
    )
    .unwrap()
}

pub fn without_locations() -> MockWizardConfig {
    MockWizardConfig {
        locations: vec![],
        ..Default::default()
    }
}
