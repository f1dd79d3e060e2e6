//! Services module
//!
//! This module contains the continuation engine and auto-dial replay

pub mod ussd;
pub mod auto_dial;

// Re-export commonly used services
pub use ussd::{Ussd, UssdBuilder, DEFAULT_MAX_REDIRECTS};
pub use auto_dial::{AutoDial, buffered_choices};
