//! Dialog handlers module
//!
//! This module contains the controller contract application code implements,
//! routes and handler results, the controller registry and the built-in
//! menu and form processors.

pub mod route;
pub mod controller;
pub mod dispatcher;
pub mod processors;

// Re-export commonly used handler types
pub use route::{Route, HandlerResult};
pub use controller::{Action, ActionSet, Controller, ControllerBase, SharedData};
pub use dispatcher::ControllerRegistry;
