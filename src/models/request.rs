//! Inbound USSD request model

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::utils::errors::{UssdError, Result};

/// Kind of inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    Initiation,
    Response,
    Release,
    Timeout,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Initiation => "Initiation",
            RequestType::Response => "Response",
            RequestType::Release => "Release",
            RequestType::Timeout => "Timeout",
        }
    }

    /// Whether the gateway ended the dialog on its side
    pub fn ends_session(&self) -> bool {
        matches!(self, RequestType::Release | RequestType::Timeout)
    }
}

impl FromStr for RequestType {
    type Err = UssdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initiation" => Ok(RequestType::Initiation),
            "response" => Ok(RequestType::Response),
            "release" => Ok(RequestType::Release),
            "timeout" => Ok(RequestType::Timeout),
            other => Err(UssdError::InvalidInput(format!("Unknown request type '{}'", other))),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RequestType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RequestType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Parsed inbound message as delivered by the USSD gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UssdRequest {
    #[serde(default)]
    pub mobile: String,
    pub session_id: String,
    #[serde(default)]
    pub service_code: String,
    #[serde(rename = "Type")]
    pub request_type: RequestType,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub sequence: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_state: Option<String>,
    /// Set on requests synthesized by auto-dial replay
    #[serde(skip)]
    pub auto_dial_originated: bool,
}

impl UssdRequest {
    pub fn new(session_id: impl Into<String>, request_type: RequestType, message: impl Into<String>) -> Self {
        Self {
            mobile: String::new(),
            session_id: session_id.into(),
            service_code: String::new(),
            request_type,
            message: message.into(),
            operator: String::new(),
            sequence: 1,
            client_state: None,
            auto_dial_originated: false,
        }
    }

    /// Build the session-initiating request for a dial string such as `*714*1#`
    pub fn initiation(session_id: impl Into<String>, service_code: impl Into<String>, dial: impl Into<String>) -> Self {
        Self::new(session_id, RequestType::Initiation, dial).with_service_code(service_code)
    }

    pub fn with_service_code(mut self, service_code: impl Into<String>) -> Self {
        self.service_code = service_code.into();
        self
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = mobile.into();
        self
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = operator.into();
        self
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_client_state(mut self, client_state: Option<String>) -> Self {
        self.client_state = client_state;
        self
    }

    pub fn trimmed_message(&self) -> &str {
        self.message.trim()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
