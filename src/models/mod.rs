//! Data models module
//!
//! This module contains the gateway request/response types and the menu and
//! form descriptors controllers render.

pub mod request;
pub mod response;
pub mod menu;
pub mod form;

// Re-export commonly used models
pub use request::{UssdRequest, RequestType};
pub use response::{UssdResponse, ResponseType};
pub use menu::{UssdMenu, UssdMenuItem};
pub use form::{UssdForm, UssdInput, InputOption};
