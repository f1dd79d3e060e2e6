//! Session backing store
//!
//! The engine only talks to [`SessionStore`]. The in-memory implementation
//! keeps plain values and field hashes in one [`ExpiringMap`] behind a single
//! mutex, so every operation on every session is serialized.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};
use crate::utils::errors::{UssdError, Result};
use super::expiring::ExpiringMap;

/// Key/value and key/field/value storage with sliding expiration.
///
/// Reads renew the entry they touch. An expired entry reads as absent; expiry
/// is never an error.
pub trait SessionStore: Send + Sync + fmt::Debug {
    fn set_value(&self, key: &str, value: &str);
    fn get_value(&self, key: &str) -> Option<String>;
    fn value_exists(&self, key: &str) -> bool;
    fn delete_value(&self, key: &str);

    fn set_hash_field(&self, name: &str, field: &str, value: &str);
    fn get_hash_field(&self, name: &str, field: &str) -> Option<String>;
    fn hash_field_exists(&self, name: &str, field: &str) -> bool;
    fn delete_hash_field(&self, name: &str, field: &str);
    fn delete_hash(&self, name: &str);

    /// Evict everything whose lifetime has run out, returning the eviction count
    fn purge_expired(&self) -> usize;

    /// Number of entries currently held
    fn entry_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq)]
enum StoreEntry {
    Value(String),
    Hash(HashMap<String, String>),
}

/// Single-process [`SessionStore`] with sliding expiration
pub struct InMemorySessionStore {
    entries: Mutex<ExpiringMap<StoreEntry>>,
    lifetime: Duration,
}

impl InMemorySessionStore {
    /// Create a store whose entries live for `lifetime` after their last use
    pub fn new(lifetime: Duration) -> Result<Self> {
        if lifetime.is_zero() {
            return Err(UssdError::InvalidInput(
                "Session store lifetime must be positive".to_string(),
            ));
        }

        debug!(lifetime_ms = lifetime.as_millis() as u64, "Created in-memory session store");
        Ok(Self {
            entries: Mutex::new(ExpiringMap::new(lifetime)),
            lifetime,
        })
    }

    /// Create a store from a lifetime in milliseconds
    pub fn with_lifetime_millis(lifetime_ms: u64) -> Result<Self> {
        Self::new(Duration::from_millis(lifetime_ms))
    }

    /// Default lifetime of entries
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Store a value with its own lifetime instead of the store default
    pub fn set_value_with_lifetime(&self, key: &str, value: &str, lifetime: Duration) {
        self.lock()
            .insert_with_lifetime(key, StoreEntry::Value(value.to_string()), lifetime);
    }

    /// Renew an entry's lifetime without reading it.
    /// Returns false when the entry is absent or already expired.
    pub fn renew(&self, key: &str) -> bool {
        self.lock().renew(key)
    }

    fn lock(&self) -> MutexGuard<'_, ExpiringMap<StoreEntry>> {
        // Every map operation leaves it consistent, even one cut short by a panic.
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Session store lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn set_value(&self, key: &str, value: &str) {
        self.lock().insert(key, StoreEntry::Value(value.to_string()));
    }

    fn get_value(&self, key: &str) -> Option<String> {
        match self.lock().get(key) {
            Some(StoreEntry::Value(value)) => Some(value.clone()),
            _ => None,
        }
    }

    fn value_exists(&self, key: &str) -> bool {
        matches!(self.lock().get(key), Some(StoreEntry::Value(_)))
    }

    fn delete_value(&self, key: &str) {
        let mut entries = self.lock();
        if matches!(entries.get(key), Some(StoreEntry::Value(_))) {
            entries.remove(key);
        } else {
            entries.purge_expired();
        }
    }

    fn set_hash_field(&self, name: &str, field: &str, value: &str) {
        let mut entries = self.lock();
        let entry = entries.get_or_insert_with(name, || StoreEntry::Hash(HashMap::new()));
        if let StoreEntry::Value(_) = entry {
            *entry = StoreEntry::Hash(HashMap::new());
        }
        if let StoreEntry::Hash(fields) = entry {
            fields.insert(field.to_string(), value.to_string());
        }
    }

    fn get_hash_field(&self, name: &str, field: &str) -> Option<String> {
        match self.lock().get(name) {
            Some(StoreEntry::Hash(fields)) => fields.get(field).cloned(),
            _ => None,
        }
    }

    fn hash_field_exists(&self, name: &str, field: &str) -> bool {
        match self.lock().get(name) {
            Some(StoreEntry::Hash(fields)) => fields.contains_key(field),
            _ => false,
        }
    }

    fn delete_hash_field(&self, name: &str, field: &str) {
        let mut entries = self.lock();
        if let Some(StoreEntry::Hash(fields)) = entries.get_mut(name) {
            fields.remove(field);
        }
        entries.purge_expired();
    }

    fn delete_hash(&self, name: &str) {
        let mut entries = self.lock();
        if matches!(entries.get(name), Some(StoreEntry::Hash(_))) {
            entries.remove(name);
        } else {
            entries.purge_expired();
        }
    }

    fn purge_expired(&self) -> usize {
        self.lock().purge_expired()
    }

    fn entry_count(&self) -> usize {
        self.lock().len()
    }
}

impl fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
