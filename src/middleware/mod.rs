//! Middleware module
//!
//! This module contains the request listener seam and its logging listener

pub mod listener;
pub mod logging;

// Re-export commonly used middleware
pub use listener::RequestListener;
pub use logging::LoggingListener;
