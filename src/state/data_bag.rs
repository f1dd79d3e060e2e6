//! Per-session data bag
//!
//! A view over one hash entry of the session store. Controllers use it as
//! scratch space that survives between round trips of the same dialog.

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::errors::Result;
use super::store::SessionStore;

/// Session-scoped key/value scratch space
#[derive(Clone)]
pub struct DataBag {
    store: Arc<dyn SessionStore>,
    key: String,
}

impl DataBag {
    /// Create a bag stored under the hash named `key`
    pub fn new(store: Arc<dyn SessionStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    /// Name of the backing hash entry
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set(&self, name: &str, value: &str) {
        self.store.set_hash_field(&self.key, name, value);
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.store.get_hash_field(&self.key, name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.store.hash_field_exists(&self.key, name)
    }

    pub fn delete(&self, name: &str) {
        self.store.delete_hash_field(&self.key, name);
    }

    /// Remove every field of this bag
    pub fn clear(&self) {
        self.store.delete_hash(&self.key);
    }

    /// Store a value as JSON
    pub fn set_data<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.set(name, &json);
        Ok(())
    }

    /// Load a value stored with [`DataBag::set_data`]
    pub fn get_data<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<Option<T>> {
        match self.get(name) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBag").field("key", &self.key).finish()
    }
}
