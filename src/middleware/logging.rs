//! Logging listener
//!
//! This module provides a request listener that records every dialog step
//! and its latency through `tracing`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use crate::models::{UssdRequest, UssdResponse};
use crate::utils::helpers::{single_line, truncate_text};
use super::listener::RequestListener;

/// Responses slower than this are reported
const SLOW_RESPONSE: Duration = Duration::from_millis(1000);
const LOGGED_MESSAGE_LENGTH: usize = 80;

/// Listener logging requests, responses and response times
#[derive(Debug)]
pub struct LoggingListener {
    log_dialog: bool,
    log_performance: bool,
    log_errors: bool,
    started: Mutex<HashMap<String, Instant>>,
}

impl LoggingListener {
    /// Create a new LoggingListener instance
    pub fn new(log_dialog: bool, log_performance: bool, log_errors: bool) -> Self {
        Self {
            log_dialog,
            log_performance,
            log_errors,
            started: Mutex::new(HashMap::new()),
        }
    }

    fn start_timer(&self, session_id: &str) {
        if let Ok(mut started) = self.started.lock() {
            started.insert(session_id.to_string(), Instant::now());
        }
    }

    fn stop_timer(&self, session_id: &str) -> Option<Duration> {
        self.started
            .lock()
            .ok()
            .and_then(|mut started| started.remove(session_id))
            .map(|start| start.elapsed())
    }

    fn log_performance(&self, request: &UssdRequest, elapsed: Duration) {
        let duration_ms = elapsed.as_millis() as u64;
        debug!(
            session_id = %request.session_id,
            request_type = %request.request_type,
            duration_ms = duration_ms,
            "Request handled"
        );

        if elapsed > SLOW_RESPONSE {
            warn!(
                session_id = %request.session_id,
                duration_ms = duration_ms,
                "Slow dialog step detected"
            );
        }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new(true, true, true)
    }
}

impl RequestListener for LoggingListener {
    fn request_entering(&self, request: &UssdRequest) {
        if self.log_performance {
            self.start_timer(&request.session_id);
        }
        if !self.log_dialog {
            return;
        }

        info!(
            session_id = %request.session_id,
            mobile = %request.mobile,
            request_type = %request.request_type,
            sequence = request.sequence,
            auto_dial = request.auto_dial_originated,
            message = %truncate_text(request.trimmed_message(), LOGGED_MESSAGE_LENGTH),
            "USSD request received"
        );
    }

    fn response_leaving(&self, request: &UssdRequest, response: &UssdResponse) {
        if self.log_performance {
            if let Some(elapsed) = self.stop_timer(&request.session_id) {
                self.log_performance(request, elapsed);
            }
        }

        if self.log_errors {
            if let Some(err) = &response.error {
                error!(
                    session_id = %request.session_id,
                    severity = %err.severity(),
                    error = %err,
                    "USSD request failed"
                );
            }
        }

        if self.log_dialog {
            info!(
                session_id = %request.session_id,
                response_type = ?response.response_type,
                next_route = response.next_route.as_deref(),
                message = %truncate_text(&single_line(&response.message), LOGGED_MESSAGE_LENGTH),
                "USSD response sent"
            );
        }
    }
}
