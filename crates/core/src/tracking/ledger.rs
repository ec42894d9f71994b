//! Persisted ledger of running tickets.
//!
//! The whole `{ticketId: startedAt}` map lives under one key and is always
//! rewritten as a unit. Edits hold the ledger lock from load to save, so two
//! writers sharing a ledger never overwrite each other's changes. Every
//! operation here is fail-soft: a store error is logged and the caller
//! carries on with what it has in memory.

use std::sync::Arc;

use chamados_domain::constants::ACTIVE_TICKETS_STORAGE_KEY;
use chamados_domain::ActiveTicketMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::ports::KeyValueStore;

#[derive(Clone)]
pub struct ActiveTicketLedger {
    store: Arc<dyn KeyValueStore>,
    edit_lock: Arc<Mutex<()>>,
}

impl ActiveTicketLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, edit_lock: Arc::new(Mutex::new(())) }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read the persisted map. Unreadable or malformed data reads as empty;
    /// entries with non-string or blank values are skipped.
    pub fn load(&self) -> ActiveTicketMap {
        let raw = match self.store.get(ACTIVE_TICKETS_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ActiveTicketMap::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read active tickets from storage");
                return ActiveTicketMap::new();
            }
        };

        let parsed: serde_json::Map<String, serde_json::Value> = match serde_json::from_str(&raw)
        {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "Discarding malformed active tickets entry");
                return ActiveTicketMap::new();
            }
        };

        parsed
            .into_iter()
            .filter_map(|(id, value)| match value {
                serde_json::Value::String(started_at) if !started_at.trim().is_empty() => {
                    Some((id, started_at))
                }
                _ => None,
            })
            .collect()
    }

    /// Replace the persisted map. An empty map removes the key.
    pub fn save(&self, map: &ActiveTicketMap) {
        let result = if map.is_empty() {
            self.store.remove(ACTIVE_TICKETS_STORAGE_KEY)
        } else {
            match serde_json::to_string(map) {
                Ok(json) => self.store.set(ACTIVE_TICKETS_STORAGE_KEY, &json),
                Err(err) => {
                    warn!(error = %err, "Failed to encode active tickets");
                    return;
                }
            }
        };

        match result {
            Ok(()) => debug!(count = map.len(), "Persisted active tickets"),
            Err(err) => warn!(error = %err, "Failed to persist active tickets"),
        }
    }

    /// Load the map, let `edit` change it and save the result, all under the
    /// ledger lock. Nothing is written when the map comes back unchanged.
    pub fn update<R>(&self, edit: impl FnOnce(&mut ActiveTicketMap) -> R) -> R {
        let _guard = self.edit_lock.lock();
        let mut map = self.load();
        let before = map.clone();
        let result = edit(&mut map);
        if map != before {
            self.save(&map);
        }
        result
    }

    /// Record `started_at` for a ticket. Returns the value it replaced.
    pub fn upsert(&self, ticket_id: &str, started_at: &str) -> Option<String> {
        self.update(|map| map.insert(ticket_id.to_string(), started_at.to_string()))
    }

    /// Drop a ticket's entry. Returns the removed `startedAt`, if any.
    pub fn forget(&self, ticket_id: &str) -> Option<String> {
        self.update(|map| map.remove(ticket_id))
    }
}
