//! Form descriptor
//!
//! A form asks for its inputs one screen at a time. The form, including the
//! values collected so far, lives in the data bag between round trips.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::utils::errors::{UssdError, Result};

/// One selectable value of an input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputOption {
    pub display: String,
    pub value: String,
}

impl InputOption {
    pub fn new(display: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            value: value.into(),
        }
    }

    /// Option whose stored value is its display text
    pub fn plain(display: impl Into<String>) -> Self {
        let display = display.into();
        Self {
            value: display.clone(),
            display,
        }
    }
}

/// A single form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdInput {
    /// Key of the collected value in the form data
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<InputOption>,
}

impl UssdInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            header: None,
            message: None,
            options: Vec::new(),
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn option(mut self, option: InputOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Resolve a reply to a 1-based option number
    pub fn choose(&self, reply: &str) -> Option<&InputOption> {
        let number: usize = reply.trim().parse().ok()?;
        number.checked_sub(1).and_then(|position| self.options.get(position))
    }

    pub fn render(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let mut rendered = String::new();
        if let Some(header) = &self.header {
            rendered.push_str(header);
            rendered.push('\n');
        }

        let label = self.display_name.as_deref().unwrap_or(&self.name);
        if self.has_options() {
            rendered.push_str(&format!("Choose {}:\n", label));
            for (position, option) in self.options.iter().enumerate() {
                rendered.push_str(&format!("{}. {}\n", position + 1, option.display));
            }
        } else {
            rendered.push_str(&format!("Enter {}:\n", label));
        }
        rendered
    }
}

/// Multi-screen form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdForm {
    pub inputs: Vec<UssdInput>,
    /// Index of the input currently on screen
    #[serde(default)]
    pub processing_position: usize,
    /// Action receiving the collected data
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl UssdForm {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            inputs: Vec::new(),
            processing_position: 0,
            action: action.into(),
            controller: None,
            data: HashMap::new(),
        }
    }

    /// Deliver the collected data to an action on another controller
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn add_input(mut self, input: UssdInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// The input currently on screen
    pub fn current_input(&self) -> Result<&UssdInput> {
        self.inputs.get(self.processing_position).ok_or_else(|| {
            UssdError::Framework(format!(
                "Invalid processing position ({}) for inputs of size {}",
                self.processing_position,
                self.inputs.len()
            ))
        })
    }

    pub fn is_last_input(&self) -> bool {
        self.processing_position + 1 >= self.inputs.len()
    }

    pub fn render(&self) -> Result<String> {
        Ok(self.current_input()?.render())
    }
}
