//! CLI Commands

pub mod check;
pub mod run;
pub mod scenarios;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use booking_driver::mock::MockWizardConfig;
use booking_driver::DriverConfig;

/// Target application and backend selection, shared by every command
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the booking application [env: BASE_URL]
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Partner subdomain (tenant) [env: TEST_SUBDOMINIO]
    #[arg(long, global = true)]
    pub tenant: Option<String>,

    /// Client phone typed into the contact step [env: TEST_CLIENTE_TELEFONE]
    #[arg(long, global = true)]
    pub phone: Option<String>,

    /// Client name typed into the contact step [env: TEST_CLIENTE_NOME]
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Client email typed into the contact step [env: TEST_CLIENTE_EMAIL]
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Multiply every settle delay (e.g. 2.0 on a slow machine, 0 to disable)
    #[arg(long, global = true)]
    pub settle_scale: Option<f64>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, global = true)]
    pub browser: Option<String>,

    /// Show the browser window
    #[arg(long, global = true)]
    pub headed: bool,

    /// Drive the in-memory wizard instead of a browser
    #[arg(long, global = true)]
    pub mock: bool,
}

/// Build the driver configuration: file, then environment, then flags.
///
/// Environment variables are read only by [`DriverConfig::apply_env`]; the
/// flags carry no env fallback of their own.
pub fn load_config(args: &TargetArgs) -> Result<DriverConfig> {
    let mut config = match &args.config {
        Some(path) => DriverConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DriverConfig::default(),
    };
    config.apply_env();

    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(tenant) = &args.tenant {
        config.tenant = tenant.clone();
    }
    if let Some(phone) = &args.phone {
        config.contact.phone = phone.clone();
    }
    if let Some(name) = &args.name {
        config.contact.name = name.clone();
    }
    if let Some(email) = &args.email {
        config.contact.email = Some(email.clone()).filter(|e| !e.is_empty());
    }
    if let Some(browser) = &args.browser {
        config.browser.browser = browser.parse()?;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(factor) = args.settle_scale {
        config.settle = config.settle.scaled(factor);
    }

    config.validate()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

/// In-memory wizard serving the configured tenant
pub fn mock_wizard(config: &DriverConfig) -> MockWizardConfig {
    MockWizardConfig {
        tenant: config.tenant.clone(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        target: TargetArgs,
    }

    fn target(args: &[&str]) -> TargetArgs {
        Harness::parse_from(std::iter::once("booking-e2e").chain(args.iter().copied())).target
    }

    #[test]
    fn test_settle_scale_multiplies_delays() {
        let config = load_config(&target(&["--settle-scale", "2"])).unwrap();
        let defaults = DriverConfig::default().settle;

        assert_eq!(config.settle.contact_lookup_ms, defaults.contact_lookup_ms * 2);
        assert_eq!(config.settle.forward_navigation_ms, defaults.forward_navigation_ms * 2);
    }

    #[test]
    fn test_flags_override_environment() {
        let config = load_config(&target(&["--tenant", "barbearia", "--email", ""])).unwrap();

        assert_eq!(config.tenant, "barbearia");
        assert_eq!(config.contact.email, None);
    }
}
