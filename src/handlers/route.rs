//! Routes and handler results

use std::fmt;
use std::str::FromStr;
use crate::utils::errors::{UssdError, Result};

/// A `controller.action` pair naming the next action to run.
///
/// The controller part may itself contain dots; the action is everything
/// after the last one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    pub controller: String,
    pub action: String,
}

impl Route {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl FromStr for Route {
    type Err = UssdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('.') {
            Some((controller, action)) if !controller.is_empty() && !action.is_empty() => {
                Ok(Route::new(controller, action))
            }
            _ => Err(UssdError::RouteResolution(format!(
                "Invalid route \"{}\": expected <controller>.<action>",
                s
            ))),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.controller, self.action)
    }
}

/// What a controller action decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// Final screen; the dialog ends
    Release {
        message: String,
        client_state: Option<String>,
    },
    /// Screen awaiting the user's reply, which `next_route` will handle
    Continue {
        message: String,
        next_route: Route,
        /// Cleared to stop auto-dial replay at this screen
        auto_dial: bool,
        client_state: Option<String>,
    },
    /// Run another action for the same message without a round trip
    Redirect { route: Route },
}

impl HandlerResult {
    pub fn release(message: impl Into<String>) -> Self {
        HandlerResult::Release {
            message: message.into(),
            client_state: None,
        }
    }

    pub fn continue_to(message: impl Into<String>, next_route: Route) -> Self {
        HandlerResult::Continue {
            message: message.into(),
            next_route,
            auto_dial: true,
            client_state: None,
        }
    }

    pub fn redirect(route: Route) -> Self {
        HandlerResult::Redirect { route }
    }

    /// Attach an opaque client state echoed back by the gateway
    pub fn with_client_state(self, state: impl Into<String>) -> Self {
        match self {
            HandlerResult::Release { message, .. } => HandlerResult::Release {
                message,
                client_state: Some(state.into()),
            },
            HandlerResult::Continue { message, next_route, auto_dial, .. } => HandlerResult::Continue {
                message,
                next_route,
                auto_dial,
                client_state: Some(state.into()),
            },
            redirect @ HandlerResult::Redirect { .. } => redirect,
        }
    }

    /// Veto auto-dial replay past this screen
    pub fn without_auto_dial(self) -> Self {
        match self {
            HandlerResult::Continue { message, next_route, client_state, .. } => HandlerResult::Continue {
                message,
                next_route,
                auto_dial: false,
                client_state,
            },
            other => other,
        }
    }
}
