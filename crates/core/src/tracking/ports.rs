//! Port interfaces for active-ticket tracking
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use chamados_domain::Result;
use tokio::sync::broadcast;

/// Change notification emitted by a [`KeyValueStore`] write.
///
/// `origin` identifies the store handle that performed the write, so a
/// context can ignore its own changes the way a browser tab never receives
/// `storage` events for its own writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub origin: u64,
}

/// Persisted key-value store shared by every context of the same origin.
///
/// Methods are synchronous: a write has been committed when the call
/// returns, before the caller awaits anything else.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Receive change events from every handle of this store.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;

    /// Identifier stamped on events written through this handle.
    fn origin(&self) -> u64;
}
