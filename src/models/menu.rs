//! Menu screen descriptor
//!
//! A menu is stored in the data bag while it is on screen, so the menu
//! processor can match the user's reply against it on the next round trip.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdMenuItem {
    /// Text the user types to pick this item
    pub index: String,
    pub display: String,
    pub action: String,
    /// Controller owning `action`; the rendering controller when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<String>,
}

impl UssdMenuItem {
    pub fn new(index: impl Into<String>, display: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            display: display.into(),
            action: action.into(),
            controller: None,
        }
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Whether `choice` selects this item, ignoring case
    pub fn matches(&self, choice: &str) -> bool {
        self.index.eq_ignore_ascii_case(choice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdMenu {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    /// Replaces the rendered header, items and footer entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub items: Vec<UssdMenuItem>,
}

impl UssdMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Append an item numbered after the items already present
    pub fn add_item(self, display: impl Into<String>, action: impl Into<String>) -> Self {
        let index = (self.items.len() + 1).to_string();
        self.push_item(UssdMenuItem::new(index, display, action))
    }

    /// Append a numbered item whose action lives on another controller
    pub fn add_item_to(self, display: impl Into<String>, action: impl Into<String>, controller: impl Into<String>) -> Self {
        let index = (self.items.len() + 1).to_string();
        self.push_item(UssdMenuItem::new(index, display, action).with_controller(controller))
    }

    pub fn push_item(mut self, item: UssdMenuItem) -> Self {
        self.items.push(item);
        self
    }

    /// Find the item selected by `choice`
    pub fn find_item(&self, choice: &str) -> Option<&UssdMenuItem> {
        self.items.iter().find(|item| item.matches(choice))
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
        for item in &self.items {
            rendered.push_str(&format!("{}. {}\n", item.index, item.display));
        }
        if let Some(footer) = &self.footer {
            rendered.push_str(footer);
        }
        rendered
    }
}
