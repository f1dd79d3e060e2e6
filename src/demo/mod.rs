//! Demo dialog used by the console simulator

pub mod main_controller;

pub use main_controller::{DemoSettings, MainController};

use crate::handlers::ControllerRegistry;

/// Registered name of the demo controller
pub const MAIN_CONTROLLER: &str = "demo.MainController";

/// Registry holding the demo controllers
pub fn demo_registry() -> ControllerRegistry {
    let mut registry = ControllerRegistry::new();
    registry.register::<MainController>(MAIN_CONTROLLER);
    registry
}
