//! Test helpers module
//!
//! This module provides utilities for driving the engine in integration
//! tests: a phone-like session driver and a handful of test controllers.

#![allow(dead_code)]

pub mod test_context;
pub mod test_controllers;

pub use test_context::*;
pub use test_controllers::*;
