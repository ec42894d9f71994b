//! JSON-file key-value store
//!
//! The whole store is one JSON object on disk. Writes go to a sibling temp
//! file that is renamed over the original, so readers never see a partial
//! document.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chamados_core::tracking::ports::{KeyValueStore, StorageEvent};
use chamados_domain::{ChamadosError, Result};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{next_origin, EVENT_CAPACITY};
use crate::errors::InfraError;

type Document = BTreeMap<String, String>;

struct Shared {
    path: PathBuf,
    write_lock: Mutex<()>,
    events: broadcast::Sender<StorageEvent>,
}

#[derive(Clone)]
pub struct FileKeyValueStore {
    shared: Arc<Shared>,
    origin: u64,
}

impl FileKeyValueStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    /// Returns `ChamadosError::Storage` if the parent directory cannot be
    /// created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| ChamadosError::from(InfraError::from(err)))?;
        }
        debug!(path = %path.display(), "Opened file store");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared { path, write_lock: Mutex::new(()), events }),
            origin: next_origin(),
        })
    }

    /// Another handle on the same file with its own origin.
    pub fn handle(&self) -> Self {
        Self { shared: Arc::clone(&self.shared), origin: next_origin() }
    }

    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    fn read_document(&self) -> Result<Document> {
        let raw = match fs::read_to_string(&self.shared.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(InfraError::from(err).into()),
        };
        if raw.trim().is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_str(&raw).map_err(|err| InfraError::from(err).into())
    }

    fn write_document(&self, document: &Document) -> Result<()> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|err| ChamadosError::from(InfraError::from(err)))?;
        let tmp = self.shared.path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|err| ChamadosError::from(InfraError::from(err)))?;
        fs::rename(&tmp, &self.shared.path).map_err(|err| InfraError::from(err).into())
    }

    fn update(&self, key: &str, value: Option<&str>) -> Result<()> {
        let changed = {
            let _guard = self.shared.write_lock.lock();
            let mut document = self.read_document().unwrap_or_else(|err| {
                warn!(
                    path = %self.shared.path.display(),
                    error = %err,
                    "Replacing unreadable store file"
                );
                Document::new()
            });

            let changed = match value {
                Some(value) => {
                    document.insert(key.to_string(), value.to_string()).as_deref() != Some(value)
                }
                None => document.remove(key).is_some(),
            };
            if changed {
                self.write_document(&document)?;
            }
            changed
        };

        if changed {
            let event = StorageEvent { key: key.to_string(), origin: self.origin };
            let _ = self.shared.events.send(event);
        }
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(key, Some(value))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.update(key, None)
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.shared.events.subscribe()
    }

    fn origin(&self) -> u64 {
        self.origin
    }
}
