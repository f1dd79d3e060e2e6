//! Error handling for the USSD framework
//!
//! This module defines the error taxonomy shared by the session store, the
//! dispatcher and the continuation engine. None of these errors escape the
//! engine: they are converted into a Release response at its boundary.

use thiserror::Error;

/// Main error type for the USSD framework
#[derive(Error, Debug)]
pub enum UssdError {
    #[error("Session does not exist: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("Route resolution failed: {0}")]
    RouteResolution(String),

    #[error("Failed to get final ussd response after {redirects} redirect{}", plural_suffix(.redirects))]
    RedirectCeilingExceeded { redirects: usize },

    #[error("Handler failed: {0}")]
    HandlerInvocation(#[from] anyhow::Error),

    #[error("Handler panicked while running \"{route}\": {message}")]
    HandlerPanicked { route: String, message: String },

    #[error("Service code {service_code} not found in initiation message {message}")]
    AutoDialServiceCodeMismatch { service_code: String, message: String },

    #[error("Framework error: {0}")]
    Framework(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn plural_suffix(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

/// Result type alias for framework operations
pub type Result<T> = std::result::Result<T, UssdError>;

impl UssdError {
    /// Check if the error is recoverable by the end user retrying the dialog
    pub fn is_recoverable(&self) -> bool {
        match self {
            UssdError::SessionNotFound { .. } => true,
            UssdError::RouteResolution(_) => false,
            UssdError::RedirectCeilingExceeded { .. } => false,
            UssdError::HandlerInvocation(_) => true,
            UssdError::HandlerPanicked { .. } => false,
            UssdError::AutoDialServiceCodeMismatch { .. } => true,
            UssdError::Framework(_) => false,
            UssdError::Config(_) => false,
            UssdError::InvalidInput(_) => true,
            UssdError::Serialization(_) => false,
            UssdError::Io(_) => true,
            UssdError::ConfigSource(_) => false,
            UssdError::Toml(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            UssdError::SessionNotFound { .. } => ErrorSeverity::Info,
            UssdError::InvalidInput(_) => ErrorSeverity::Info,
            UssdError::AutoDialServiceCodeMismatch { .. } => ErrorSeverity::Warning,
            UssdError::RouteResolution(_) => ErrorSeverity::Critical,
            UssdError::RedirectCeilingExceeded { .. } => ErrorSeverity::Critical,
            UssdError::HandlerPanicked { .. } => ErrorSeverity::Critical,
            UssdError::Config(_) => ErrorSeverity::Critical,
            UssdError::ConfigSource(_) => ErrorSeverity::Critical,
            UssdError::Toml(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_ceiling_message_pluralizes() {
        let one = UssdError::RedirectCeilingExceeded { redirects: 1 };
        let five = UssdError::RedirectCeilingExceeded { redirects: 5 };

        assert_eq!(one.to_string(), "Failed to get final ussd response after 1 redirect");
        assert_eq!(five.to_string(), "Failed to get final ussd response after 5 redirects");
    }

    #[test]
    fn test_handler_errors_convert_from_anyhow() {
        let err: UssdError = anyhow::anyhow!("balance service down").into();

        assert!(matches!(err, UssdError::HandlerInvocation(_)));
        assert!(err.to_string().contains("balance service down"));
    }

    #[test]
    fn test_severity() {
        assert_eq!(
            UssdError::SessionNotFound { session_id: "s".into() }.severity(),
            ErrorSeverity::Info
        );
        assert_eq!(
            UssdError::RedirectCeilingExceeded { redirects: 5 }.severity(),
            ErrorSeverity::Critical
        );
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}
