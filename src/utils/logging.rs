//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the USSD framework.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use crate::config::LoggingConfig;
use crate::utils::errors::{UssdError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped, so the caller must
/// keep it alive for as long as it wants file logging.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| UssdError::Config(format!("Invalid log filter '{}': {}", config.level, e)))?;

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stdout).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stdout).boxed()
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "ussd.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| UssdError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log session lifecycle events (created, continued, closed)
pub fn log_session_event(session_id: &str, event: &str, route: Option<&str>) {
    info!(
        session_id = session_id,
        event = event,
        route = route,
        "Session event"
    );
}

/// Log a dispatch to a controller action
pub fn log_dispatch(session_id: &str, route: &str, controller: &str, redirects: usize) {
    debug!(
        session_id = session_id,
        route = route,
        controller = controller,
        redirects = redirects,
        "Dispatching route"
    );
}

/// Log an auto-dial replay step, or why replay stopped
pub fn log_auto_dial(session_id: &str, step: usize, choice: &str, outcome: &str) {
    debug!(
        session_id = session_id,
        step = step,
        choice = choice,
        outcome = outcome,
        "Auto-dial replay"
    );
}

/// Log a store sweep
pub fn log_store_sweep(evicted: usize, live: usize) {
    if evicted > 0 {
        debug!(evicted = evicted, live = live, "Expired session entries evicted");
    }
}

/// Log an error converted into a release response at the engine boundary
pub fn log_engine_error(session_id: &str, error: &UssdError) {
    if error.is_recoverable() {
        warn!(
            session_id = session_id,
            severity = %error.severity(),
            error = %error,
            "Dialog ended by error"
        );
    } else {
        error!(
            session_id = session_id,
            severity = %error.severity(),
            error = %error,
            "Dialog ended by error"
        );
    }
}
