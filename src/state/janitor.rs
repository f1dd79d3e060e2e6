//! Background store sweeping
//!
//! The store already evicts on every mutation; the janitor reclaims memory
//! while no requests arrive.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use crate::utils::logging::log_store_sweep;
use super::store::SessionStore;

/// Periodically purges expired entries from a session store
#[derive(Debug)]
pub struct StoreJanitor {
    store: Arc<dyn SessionStore>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl StoreJanitor {
    pub fn new(store: Arc<dyn SessionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            handle: None,
        }
    }

    /// Start the sweep task on the current tokio runtime
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Store janitor is already running");
            return;
        }

        let store = Arc::clone(&self.store);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let evicted = store.purge_expired();
                log_store_sweep(evicted, store.entry_count());
            }
        });

        self.handle = Some(handle);
        info!("Started store janitor with interval {:?}", self.interval);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Stopped store janitor");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for StoreJanitor {
    fn drop(&mut self) {
        self.stop();
    }
}
