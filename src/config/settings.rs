//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::utils::errors::Result;

/// Main application configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub ussd: UssdConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub simulator: SimulatorConfig,
}

/// Continuation engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UssdConfig {
    /// Controller whose action starts every dialog
    pub initiation_controller: String,
    /// Action run on an initiation message
    pub initiation_action: String,
    /// Prefixes tried when a route's controller name is not registered verbatim
    pub controller_namespaces: Vec<String>,
    /// Message shown to the user instead of the error text when a dialog fails
    pub error_message: Option<String>,
    /// How many buffered dial string choices may be replayed; 0 disables auto-dial
    pub max_auto_dial_depth: usize,
    /// Internal redirects allowed while answering one message
    pub max_redirects: usize,
}

/// Session store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// The transport's own session timeout
    pub session_timeout_ms: u64,
    /// Added to the transport timeout so the store outlives the transport's session
    pub safety_margin_ms: u64,
    /// Period of the background sweep; 0 disables the janitor
    pub sweep_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for daily rolling log files; stdout only when absent
    pub directory: Option<String>,
    pub json: bool,
}

/// Console simulator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub service_code: String,
    pub mobile: String,
    pub operator: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("USSD")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ussd.controller_namespaces")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load settings from a specific configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse settings from a TOML document
    pub fn from_toml_str(document: &str) -> Result<Self> {
        Ok(toml::from_str(document)?)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        super::validation::validate_settings(self)
    }
}

impl StoreConfig {
    /// Lifetime of every store entry: the transport timeout plus the safety margin
    pub fn entry_lifetime(&self) -> Duration {
        Duration::from_millis(self.session_timeout_ms.saturating_add(self.safety_margin_ms))
    }

    /// Janitor period, if the janitor is enabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        if self.sweep_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.sweep_interval_secs))
        }
    }
}

impl UssdConfig {
    /// Route run on an initiation message
    pub fn initiation_route(&self) -> String {
        format!("{}.{}", self.initiation_controller, self.initiation_action)
    }
}

impl Default for UssdConfig {
    fn default() -> Self {
        Self {
            initiation_controller: "Main".to_string(),
            initiation_action: "start".to_string(),
            controller_namespaces: vec!["demo".to_string()],
            error_message: None,
            max_auto_dial_depth: 0,
            max_redirects: 5,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            session_timeout_ms: 70_000,
            safety_margin_ms: 10_000,
            sweep_interval_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            json: false,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            service_code: "*714#".to_string(),
            mobile: "233200000000".to_string(),
            operator: "mtn".to_string(),
        }
    }
}
