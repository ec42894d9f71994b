//! In-memory `KeyValueStore` that counts writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use chamados_core::tracking::ports::{KeyValueStore, StorageEvent};
use chamados_domain::constants::ACTIVE_TICKETS_STORAGE_KEY;
use chamados_domain::{ActiveTicketMap, ChamadosError, Result as DomainResult};
use parking_lot::Mutex;
use tokio::sync::broadcast;

pub struct MockStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    read_pause: Mutex<Option<(Arc<Barrier>, Duration)>>,
    events: broadcast::Sender<StorageEvent>,
}

impl Default for MockStore {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            values: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            read_pause: Mutex::new(None),
            events,
        }
    }
}

impl MockStore {
    /// Store seeded with an active-ticket map, write counter at zero.
    pub fn with_active(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        let map: ActiveTicketMap =
            entries.iter().map(|(id, at)| (id.to_string(), at.to_string())).collect();
        store.put_raw(ACTIVE_TICKETS_STORAGE_KEY, &serde_json::to_string(&map).unwrap());
        store
    }

    /// Write without counting or notifying.
    pub fn put_raw(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Persisted active map as a test would read it back.
    pub fn active_map(&self) -> ActiveTicketMap {
        self.raw(ACTIVE_TICKETS_STORAGE_KEY)
            .map(|raw| serde_json::from_str(&raw).unwrap())
            .unwrap_or_default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// The next `get` reads its value, meets `barrier`, then holds on to the
    /// value for `hold` before returning it.
    pub fn pause_next_read(&self, barrier: Arc<Barrier>, hold: Duration) {
        *self.read_pause.lock() = Some((barrier, hold));
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn write(&self, key: &str, value: Option<&str>) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChamadosError::Storage("quota exceeded".into()));
        }
        {
            let mut values = self.values.lock();
            match value {
                Some(value) => values.insert(key.to_string(), value.to_string()),
                None => values.remove(key),
            };
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        let _ = self.events.send(StorageEvent { key: key.to_string(), origin: self.origin() });
        Ok(())
    }
}

impl KeyValueStore for MockStore {
    fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let value = self.raw(key);
        let pause = self.read_pause.lock().take();
        if let Some((barrier, hold)) = pause {
            barrier.wait();
            std::thread::sleep(hold);
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        self.write(key, Some(value))
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        self.write(key, None)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    fn origin(&self) -> u64 {
        0
    }
}
