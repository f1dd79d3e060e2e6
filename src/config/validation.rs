//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use regex::Regex;
use crate::utils::errors::{UssdError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_ussd_config(&settings.ussd)?;
    validate_store_config(&settings.store)?;
    validate_logging_config(&settings.logging)?;
    validate_simulator_config(&settings.simulator)?;

    Ok(())
}

/// Validate continuation engine configuration
fn validate_ussd_config(config: &super::UssdConfig) -> Result<()> {
    if config.initiation_controller.trim().is_empty() {
        return Err(UssdError::Config(
            "Initiation controller is required".to_string()
        ));
    }

    if config.initiation_action.trim().is_empty() {
        return Err(UssdError::Config(
            "Initiation action is required".to_string()
        ));
    }

    if config.initiation_action.contains('.') {
        return Err(UssdError::Config(
            format!("Initiation action cannot contain '.': {}", config.initiation_action)
        ));
    }

    if config.max_redirects == 0 {
        return Err(UssdError::Config(
            "Max redirects must be greater than 0".to_string()
        ));
    }

    if config.controller_namespaces.iter().any(|ns| ns.trim().is_empty()) {
        return Err(UssdError::Config(
            "Controller namespaces cannot be empty strings".to_string()
        ));
    }

    Ok(())
}

/// Validate session store configuration
fn validate_store_config(config: &super::StoreConfig) -> Result<()> {
    if config.session_timeout_ms == 0 {
        return Err(UssdError::Config(
            "Session timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(UssdError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(UssdError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

/// Validate console simulator configuration
fn validate_simulator_config(config: &super::SimulatorConfig) -> Result<()> {
    if !is_dial_string(&config.service_code) {
        return Err(UssdError::Config(
            format!("Invalid service code: {}. Expected a dial string like *714#", config.service_code)
        ));
    }

    Ok(())
}

/// Check that a string looks like a USSD dial string, e.g. `*714#` or `*714*2#`
pub fn is_dial_string(candidate: &str) -> bool {
    match Regex::new(r"^\*\d+(\*\d+)*#$") {
        Ok(pattern) => pattern.is_match(candidate),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_strings() {
        assert!(is_dial_string("*714#"));
        assert!(is_dial_string("*714*2*1#"));
        assert!(!is_dial_string("714#"));
        assert!(!is_dial_string("*714"));
        assert!(!is_dial_string("*71a#"));
        assert!(!is_dial_string("**714#"));
    }

    #[test]
    fn test_rejects_zero_redirects() {
        let mut settings = Settings::default();
        settings.ussd.max_redirects = 0;

        assert!(matches!(settings.validate(), Err(UssdError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_session_timeout() {
        let mut settings = Settings::default();
        settings.store.session_timeout_ms = 0;

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_dotted_initiation_action() {
        let mut settings = Settings::default();
        settings.ussd.initiation_action = "menu.start".to_string();

        assert!(settings.validate().is_err());
    }
}
