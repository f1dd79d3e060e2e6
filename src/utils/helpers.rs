//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the framework.

use uuid::Uuid;

/// Generate a new session identifier
pub fn generate_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Collapse a multi-line screen into one line for log output
pub fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Split a USSD dial string into its non-empty segments.
///
/// `#` is treated like `*` so that `*714*1*2#` yields `["714", "1", "2"]`.
pub fn dial_segments(dial: &str) -> Vec<String> {
    dial.split(['*', '#'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
