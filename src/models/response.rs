//! Outbound USSD response model

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::errors::{UssdError, Result};

/// Kind of outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseType {
    /// The gateway keeps the session open and waits for user input
    Response,
    /// The gateway ends the session
    Release,
}

/// Response handed back to the gateway.
///
/// Only the type, message and client state go over the wire; the remaining
/// fields are for the process that produced the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UssdResponse {
    #[serde(rename = "Type")]
    pub response_type: ResponseType,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    /// Error that ended the dialog, if any
    #[serde(skip)]
    pub error: Option<Arc<UssdError>>,
    /// Route stored for the next round trip
    #[serde(skip)]
    pub next_route: Option<String>,
    #[serde(skip)]
    pub auto_dial_on: bool,
}

impl UssdResponse {
    /// Final message; the dialog is over
    pub fn release(message: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Release,
            message: message.into(),
            client_state: None,
            error: None,
            next_route: None,
            auto_dial_on: false,
        }
    }

    /// Intermediate message; `next_route` handles the user's reply
    pub fn continue_with(message: impl Into<String>, next_route: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Response,
            message: message.into(),
            client_state: None,
            error: None,
            next_route: Some(next_route.into()),
            auto_dial_on: true,
        }
    }

    /// Release response describing an error
    pub fn from_error(message: impl Into<String>, error: UssdError) -> Self {
        let mut response = Self::release(message);
        response.error = Some(Arc::new(error));
        response
    }

    pub fn with_client_state(mut self, client_state: Option<String>) -> Self {
        self.client_state = client_state;
        self
    }

    pub fn is_release(&self) -> bool {
        self.response_type == ResponseType::Release
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
