//! Session state module
//!
//! This module holds the expiring session store, the per-session data bag
//! and the request-scoped session context.

pub mod expiring;
pub mod store;
pub mod data_bag;
pub mod context;
pub mod janitor;

// Re-export commonly used state components
pub use expiring::ExpiringMap;
pub use store::{SessionStore, InMemorySessionStore};
pub use data_bag::DataBag;
pub use context::UssdContext;
pub use janitor::StoreJanitor;
