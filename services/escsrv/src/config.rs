//! Service configuration
//!
//! Layered loading via figment: YAML file first, `ESCSRV_`-prefixed
//! environment variables on top. Provider credentials are expected to
//! arrive via environment in production.

use std::path::Path;

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::engine::Contact;
use crate::error::{EscSrvError, Result};

/// Default API port for escsrv
pub const DEFAULT_PORT: u16 = 6005;

/// Default config file path, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/escsrv.yaml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub escalation: EscalationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Voice provider endpoint and credentials
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// REST API root, without trailing slash
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
    /// Account identifier, also the basic-auth user
    #[serde(default)]
    pub account_sid: String,
    /// Basic-auth secret
    #[serde(default)]
    pub auth_token: String,
    /// Caller address notifications originate from
    #[serde(default)]
    pub from_address: String,
    /// Public base URL of this service, where the provider fetches voice content
    #[serde(default = "default_content_base_url")]
    pub content_base_url: String,
    /// Timeout for any single provider request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Cascade behavior and the contact roster
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EscalationConfig {
    /// Seconds between status samples inside a contact's wait window
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Upper bound in seconds on a single notifier/poller call
    #[serde(default = "default_request_timeout")]
    pub collaborator_timeout_seconds: u64,
    /// Contacts in priority order
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

fn default_service_name() -> String {
    "escsrv".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_provider_base_url() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}

fn default_content_base_url() -> String {
    format!("http://localhost:{}", DEFAULT_PORT)
}

fn default_request_timeout() -> u64 {
    10
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            account_sid: String::new(),
            auth_token: String::new(),
            from_address: String::new(),
            content_base_url: default_content_base_url(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            collaborator_timeout_seconds: default_request_timeout(),
            contacts: Vec::new(),
        }
    }
}

impl Config {
    /// Load from the default path with environment overrides
    pub fn load() -> Result<Self> {
        Self::from_file(DEFAULT_CONFIG_PATH)
    }

    /// Load from a specific YAML file with environment overrides
    ///
    /// Environment variables use the `ESCSRV_` prefix and `__` as the
    /// section separator, e.g. `ESCSRV_PROVIDER__AUTH_TOKEN`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Config = Figment::new()
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("ESCSRV_").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Validate the loaded configuration
    ///
    /// An empty roster is allowed at boot (the health surface must stay
    /// reachable) but logged loudly; every run against it terminates as
    /// a zero-attempt failure.
    pub fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(EscSrvError::config("api.port must be non-zero"));
        }
        if self.escalation.poll_interval_seconds == 0 {
            return Err(EscSrvError::config(
                "escalation.poll_interval_seconds must be at least 1",
            ));
        }
        if self.escalation.collaborator_timeout_seconds == 0 {
            return Err(EscSrvError::config(
                "escalation.collaborator_timeout_seconds must be at least 1",
            ));
        }
        for contact in &self.escalation.contacts {
            if contact.name.is_empty() {
                return Err(EscSrvError::config("contact name must not be empty"));
            }
            if contact.address.is_empty() {
                return Err(EscSrvError::config(format!(
                    "contact {} has an empty address",
                    contact.name
                )));
            }
        }
        if self.escalation.contacts.is_empty() {
            warn!("No escalation contacts configured; every run will fail with zero attempts");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = Config::default();
        assert_eq!(config.api.port, DEFAULT_PORT);
        assert_eq!(config.service.name, "escsrv");
        config.validate().unwrap();
    }

    #[test]
    fn test_loaded_defaults_validate() {
        let config: Config = serde_yaml::from_str("service:\n  name: escsrv\n").unwrap();
        assert_eq!(config.escalation.poll_interval_seconds, 5);
        assert_eq!(config.escalation.collaborator_timeout_seconds, 10);
        config.validate().unwrap();
    }

    #[test]
    fn test_from_file_reads_contacts_in_order() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r"
escalation:
  poll_interval_seconds: 2
  contacts:
    - name: Primary
      address: '+917568735073'
      wait_seconds: 60
    - name: Secondary
      address: '+917568735074'
"
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.escalation.poll_interval_seconds, 2);
        assert_eq!(config.escalation.contacts.len(), 2);
        assert_eq!(config.escalation.contacts[0].name, "Primary");
        assert_eq!(config.escalation.contacts[1].wait_seconds, 60);
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let mut config: Config = serde_yaml::from_str("api:\n  port: 6005\n").unwrap();
        config.escalation.poll_interval_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_contact_address() {
        let mut config: Config = serde_yaml::from_str("api:\n  port: 6005\n").unwrap();
        config.escalation.contacts.push(Contact {
            name: "Primary".to_string(),
            address: String::new(),
            wait_seconds: 30,
        });
        assert!(config.validate().is_err());
    }
}
