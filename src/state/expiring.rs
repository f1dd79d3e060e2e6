//! Sliding-expiration map
//!
//! A map whose entries disappear once they have gone unused for their
//! lifetime. Reading an entry renews it. Eviction is driven by a min-heap of
//! expiry markers ordered by instant; each live key remembers the marker that
//! currently represents it, and any popped marker that is not the key's current
//! marker is discarded without touching the key. Renewal never pushes a new
//! marker: a popped marker whose key was renewed in the meantime is simply
//! rescheduled at the key's new expiry, so the heap holds at most one marker
//! per live key plus stale markers left behind by overwrites and deletes.
//!
//! The map itself is not synchronized; the session store wraps it in a mutex.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Slot<V> {
    value: V,
    lifetime: Duration,
    expires_at: Instant,
    marker: u64,
}

impl<V> Slot<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    fn renew(&mut self, now: Instant) {
        self.expires_at = now + self.lifetime;
    }
}

/// Heap entry ordering keys by expiry instant, then by marker
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ExpiryMarker {
    expires_at: Instant,
    marker: u64,
    key: String,
}

/// Map with per-entry sliding expiration
#[derive(Debug)]
pub struct ExpiringMap<V> {
    entries: HashMap<String, Slot<V>>,
    queue: BinaryHeap<Reverse<ExpiryMarker>>,
    default_lifetime: Duration,
    next_marker: u64,
}

impl<V> ExpiringMap<V> {
    /// Create a map whose entries live for `default_lifetime` unless told otherwise
    pub fn new(default_lifetime: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            queue: BinaryHeap::new(),
            default_lifetime,
            next_marker: 0,
        }
    }

    /// Lifetime given to entries inserted with [`ExpiringMap::insert`]
    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }

    /// Insert with the default lifetime, returning the previous live value
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        self.insert_with_lifetime(key, value, self.default_lifetime)
    }

    /// Insert with an explicit lifetime, returning the previous live value
    pub fn insert_with_lifetime(&mut self, key: &str, value: V, lifetime: Duration) -> Option<V> {
        let now = Instant::now();
        self.sweep_at(now);

        let marker = self.allocate_marker();
        let expires_at = now + lifetime;
        let slot = Slot { value, lifetime, expires_at, marker };
        self.queue.push(Reverse(ExpiryMarker { expires_at, marker, key: key.to_string() }));

        // The old slot's marker stays in the heap and is discarded when popped.
        self.entries
            .insert(key.to_string(), slot)
            .filter(|old| old.is_live(now))
            .map(|old| old.value)
    }

    /// Read an entry, renewing its lifetime
    pub fn get(&mut self, key: &str) -> Option<&V> {
        self.get_mut(key).map(|value| &*value)
    }

    /// Mutably borrow an entry, renewing its lifetime
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    occupied.get_mut().renew(now);
                    Some(&mut occupied.into_mut().value)
                } else {
                    occupied.remove();
                    None
                }
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Borrow an entry mutably, creating it with `init` if absent or expired.
    /// Either way the entry's lifetime is renewed.
    pub fn get_or_insert_with(&mut self, key: &str, init: impl FnOnce() -> V) -> &mut V {
        let now = Instant::now();
        self.sweep_at(now);

        let Self { entries, queue, default_lifetime, next_marker } = self;
        let mut fresh_slot = || {
            let marker = *next_marker;
            *next_marker = next_marker.wrapping_add(1);
            let expires_at = now + *default_lifetime;
            queue.push(Reverse(ExpiryMarker { expires_at, marker, key: key.to_string() }));
            Slot { value: init(), lifetime: *default_lifetime, expires_at, marker }
        };

        match entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_live(now) => {
                occupied.get_mut().renew(now);
                &mut occupied.into_mut().value
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(fresh_slot());
                &mut occupied.into_mut().value
            }
            Entry::Vacant(vacant) => &mut vacant.insert(fresh_slot()).value,
        }
    }

    /// Check for a live entry, renewing it
    pub fn contains_key(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Renew an entry's lifetime without reading it
    pub fn renew(&mut self, key: &str) -> bool {
        self.contains_key(key)
    }

    /// Remove an entry, returning its value if it was still live
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let now = Instant::now();
        let removed = self
            .entries
            .remove(key)
            .filter(|slot| slot.is_live(now))
            .map(|slot| slot.value);
        self.sweep_at(now);
        removed
    }

    /// Evict every entry whose expiry has passed, returning how many were evicted.
    ///
    /// Cost is proportional to the number of markers that have come due, not
    /// to the number of live keys.
    pub fn purge_expired(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Number of entries physically held, including expired entries not yet swept
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of markers waiting in the expiry queue
    pub fn pending_markers(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.queue.clear();
    }

    fn allocate_marker(&mut self) -> u64 {
        let marker = self.next_marker;
        self.next_marker = self.next_marker.wrapping_add(1);
        marker
    }

    fn sweep_at(&mut self, now: Instant) -> usize {
        let mut evicted = 0;
        while let Some(Reverse(head)) = self.queue.peek() {
            if head.expires_at > now {
                break;
            }
            let Some(Reverse(due)) = self.queue.pop() else {
                break;
            };

            let Some(slot) = self.entries.get(&due.key) else {
                continue;
            };
            if slot.marker != due.marker {
                continue;
            }
            if slot.is_live(now) {
                // Renewed since this marker was queued.
                self.queue.push(Reverse(ExpiryMarker {
                    expires_at: slot.expires_at,
                    marker: due.marker,
                    key: due.key,
                }));
                continue;
            }

            self.entries.remove(&due.key);
            evicted += 1;
        }
        evicted
    }
}
