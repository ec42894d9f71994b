//! In-memory key-value store

use std::collections::HashMap;
use std::sync::Arc;

use chamados_core::tracking::ports::{KeyValueStore, StorageEvent};
use chamados_domain::Result;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

use super::{next_origin, EVENT_CAPACITY};

struct Shared {
    values: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

/// Process-local store. Nothing survives a restart.
#[derive(Clone)]
pub struct MemoryKeyValueStore {
    shared: Arc<Shared>,
    origin: u64,
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared { values: RwLock::new(HashMap::new()), events }),
            origin: next_origin(),
        }
    }

    /// Another handle on the same data with its own origin.
    pub fn handle(&self) -> Self {
        Self { shared: Arc::clone(&self.shared), origin: next_origin() }
    }

    fn notify(&self, key: &str) {
        // No receivers is fine.
        let _ = self.shared.events.send(StorageEvent { key: key.to_string(), origin: self.origin });
        trace!(key, origin = self.origin, "Store changed");
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.shared.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.shared.values.write().insert(key.to_string(), value.to_string());
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let removed = self.shared.values.write().remove(key);
        if removed.is_some() {
            self.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.shared.events.subscribe()
    }

    fn origin(&self) -> u64 {
        self.origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_share_data() {
        let store = MemoryKeyValueStore::new();
        let other = store.handle();

        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        assert_ne!(store.origin(), other.origin());
    }

    #[test]
    fn writes_are_broadcast_with_origin() {
        let store = MemoryKeyValueStore::new();
        let other = store.handle();
        let mut events = store.subscribe();

        other.set("k", "v").unwrap();
        let event = events.try_recv().unwrap();
        assert_eq!(event, StorageEvent { key: "k".into(), origin: other.origin() });

        // Removing a missing key is silent.
        store.remove("missing").unwrap();
        assert!(events.try_recv().is_err());
    }
}
