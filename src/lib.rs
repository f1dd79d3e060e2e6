//! USSD Framework
//!
//! A framework for multi-turn USSD dialogs. Application code registers
//! controllers whose actions render screens; the engine keeps each dialog's
//! next route and data bag in an expiring session store between gateway
//! round trips, follows internal redirects within a request and can replay
//! choices the user typed ahead in the dial string.

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod state;
pub mod utils;
pub mod middleware;
pub mod demo;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{UssdError, Result};

// Re-export main components for easy access
pub use handlers::{ActionSet, Controller, ControllerBase, ControllerRegistry, HandlerResult, Route};
pub use models::{UssdRequest, UssdResponse, RequestType, ResponseType, UssdMenu, UssdForm, UssdInput};
pub use services::{Ussd, UssdBuilder};
pub use state::{SessionStore, InMemorySessionStore, DataBag};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
