//! Driver configuration
//!
//! Loaded from an optional TOML file, then overridden by the environment
//! variables the booking suite has always honoured.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};
use crate::playwright::PlaywrightConfig;
use crate::settle::SettlePolicy;
use crate::wait::{WaitConfig, MAX_WAIT_MS};

pub const ENV_BASE_URL: &str = "BASE_URL";
pub const ENV_TENANT: &str = "TEST_SUBDOMINIO";
pub const ENV_PHONE: &str = "TEST_CLIENTE_TELEFONE";
pub const ENV_NAME: &str = "TEST_CLIENTE_NOME";
pub const ENV_EMAIL: &str = "TEST_CLIENTE_EMAIL";

/// Top-level driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Base URL of the booking application
    pub base_url: String,

    /// Partner subdomain / tenant identifier
    pub tenant: String,

    /// Contact data used when none is supplied explicitly
    pub contact: ContactDefaults,

    /// Bounded visibility waits
    pub waits: WaitConfig,

    /// Settle delays per action class
    pub settle: SettlePolicy,

    /// Keyword carried by the forward control's label on the terminal step
    pub confirm_keyword: String,

    /// Browser settings for the Playwright backend
    pub browser: PlaywrightConfig,

    /// How long to wait for the application to answer before a run
    pub app_startup_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            tenant: "demo".to_string(),
            contact: ContactDefaults::default(),
            waits: WaitConfig::default(),
            settle: SettlePolicy::default(),
            confirm_keyword: "Confirmar".to_string(),
            browser: PlaywrightConfig::default(),
            app_startup_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDefaults {
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
}

impl Default for ContactDefaults {
    fn default() -> Self {
        Self {
            phone: "11999999999".to_string(),
            name: "João da Silva Teste".to_string(),
            email: Some("joao.teste@example.com".to_string()),
        }
    }
}

impl DriverConfig {
    /// Parse a configuration from a TOML string
    pub fn from_toml(content: &str) -> DriverResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a TOML file
    pub fn from_file(path: &Path) -> DriverResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Apply environment overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup; empty values are ignored
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(tenant) = get(ENV_TENANT) {
            self.tenant = tenant;
        }
        if let Some(phone) = get(ENV_PHONE) {
            self.contact.phone = phone;
        }
        if let Some(name) = get(ENV_NAME) {
            self.contact.name = name;
        }
        if let Some(email) = get(ENV_EMAIL) {
            self.contact.email = Some(email);
        }
    }

    pub fn validate(&self) -> DriverResult<()> {
        if self.tenant.trim().is_empty() {
            return Err(DriverError::Config("tenant must not be empty".to_string()));
        }
        if self.tenant.contains('/') {
            return Err(DriverError::Config(format!(
                "tenant '{}' must be a single path segment",
                self.tenant
            )));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(DriverError::Config(format!(
                "base_url '{}' must be an http(s) URL",
                self.base_url
            )));
        }
        if self.confirm_keyword.is_empty() {
            return Err(DriverError::Config("confirm_keyword must not be empty".to_string()));
        }
        if self.waits.poll_interval_ms == 0 {
            return Err(DriverError::Config("poll_interval_ms must be positive".to_string()));
        }
        for (key, ms) in [
            ("visibility_timeout_ms", self.waits.visibility_timeout_ms),
            ("slot_timeout_ms", self.waits.slot_timeout_ms),
            ("poll_interval_ms", self.waits.poll_interval_ms),
        ] {
            if ms > MAX_WAIT_MS {
                return Err(DriverError::Config(format!(
                    "{} must not exceed {} ms",
                    key, MAX_WAIT_MS
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_suite_environment() {
        let config = DriverConfig::default();
        assert_eq!(config.tenant, "demo");
        assert_eq!(config.contact.phone, "11999999999");
        assert_eq!(config.waits.visibility_timeout_ms, 10_000);
        assert_eq!(config.waits.slot_timeout_ms, 10_000);
        config.validate().unwrap();
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_TENANT, "barbearia"),
            (ENV_PHONE, "21988887777"),
            (ENV_EMAIL, ""),
        ]
        .into_iter()
        .collect();

        let mut config = DriverConfig::default();
        config.apply_vars(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.tenant, "barbearia");
        assert_eq!(config.contact.phone, "21988887777");
        // Empty values do not clear the default
        assert_eq!(config.contact.email.as_deref(), Some("joao.teste@example.com"));
        assert_eq!(config.contact.name, "João da Silva Teste");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = DriverConfig::from_toml(
            r#"
tenant = "clinica"
confirm_keyword = "Confirm"

[waits]
slot_timeout_ms = 15000

[settle]
contact_lookup_ms = 2500
"#,
        )
        .unwrap();
        assert_eq!(config.tenant, "clinica");
        assert_eq!(config.waits.slot_timeout_ms, 15_000);
        assert_eq!(config.waits.visibility_timeout_ms, 10_000);
        assert_eq!(config.settle.contact_lookup_ms, 2500);
        assert_eq!(config.settle.date_selection_ms, 1000);
    }

    #[test]
    fn test_rejects_unbounded_waits() {
        let err = DriverConfig::from_toml(
            r#"
[waits]
slot_timeout_ms = 86400000
"#,
        )
        .unwrap_err();
        match err {
            DriverError::Config(message) => assert!(message.contains("slot_timeout_ms")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_rejects_bad_tenant() {
        let err = DriverConfig::from_toml(r#"tenant = "a/b""#).unwrap_err();
        assert!(matches!(err, DriverError::Config(_)));
    }
}
