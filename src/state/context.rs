//! Session context
//!
//! Binds one inbound request to the session state it owns in the store: the
//! next route and the data bag. A session with no next route does not exist.

use std::sync::Arc;
use tracing::debug;
use crate::models::request::UssdRequest;
use super::data_bag::DataBag;
use super::store::SessionStore;

/// Suffix of the store key holding a session's next route
pub const NEXT_ROUTE_SUFFIX: &str = "NextRoute";
/// Suffix of the store key holding a session's data bag
pub const DATA_BAG_SUFFIX: &str = "DataBag";

/// Session state accessor for a single request
#[derive(Debug, Clone)]
pub struct UssdContext {
    store: Arc<dyn SessionStore>,
    request: UssdRequest,
    next_route_key: String,
    data_bag_key: String,
}

impl UssdContext {
    pub fn new(store: Arc<dyn SessionStore>, request: UssdRequest) -> Self {
        let next_route_key = session_key(&request.session_id, NEXT_ROUTE_SUFFIX);
        let data_bag_key = session_key(&request.session_id, DATA_BAG_SUFFIX);
        Self {
            store,
            request,
            next_route_key,
            data_bag_key,
        }
    }

    pub fn request(&self) -> &UssdRequest {
        &self.request
    }

    /// Replace the request while keeping the same session, as replayed dial
    /// choices do
    pub fn set_request(&mut self, request: UssdRequest) {
        self.request = request;
    }

    pub fn session_id(&self) -> &str {
        &self.request.session_id
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Whether the session has a live next route
    pub fn session_exists(&self) -> bool {
        self.store.value_exists(&self.next_route_key)
    }

    /// Load the next route, renewing the session
    pub fn next_route(&self) -> Option<String> {
        self.store.get_value(&self.next_route_key)
    }

    pub fn set_next_route(&self, route: &str) {
        debug!(session_id = %self.session_id(), route = route, "Next route stored");
        self.store.set_value(&self.next_route_key, route);
    }

    /// Drop the next route and every data bag field of the session
    pub fn close(&self) {
        self.store.delete_value(&self.next_route_key);
        self.store.delete_hash(&self.data_bag_key);
    }

    pub fn data_bag(&self) -> DataBag {
        DataBag::new(Arc::clone(&self.store), self.data_bag_key.clone())
    }
}

fn session_key(session_id: &str, suffix: &str) -> String {
    format!("{}.{}", session_id, suffix)
}
