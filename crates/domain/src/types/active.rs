//! Locally persisted record of running tickets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ticket id to the `startedAt` this client holds for it.
///
/// Serialized as the JSON object stored under
/// [`ACTIVE_TICKETS_STORAGE_KEY`](crate::constants::ACTIVE_TICKETS_STORAGE_KEY).
pub type ActiveTicketMap = BTreeMap<String, String>;

/// Ticket id to elapsed seconds, recomputed on every refresh tick.
pub type ElapsedTimes = BTreeMap<String, u64>;

/// One running ticket as seen by this client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTicketEntry {
    pub ticket_id: String,
    pub started_at: String,
}

impl ActiveTicketEntry {
    pub fn new(ticket_id: impl Into<String>, started_at: impl Into<String>) -> Self {
        Self { ticket_id: ticket_id.into(), started_at: started_at.into() }
    }
}

/// Expand a persisted map into entries, ordered by ticket id.
pub fn entries_from_map(map: &ActiveTicketMap) -> Vec<ActiveTicketEntry> {
    map.iter().map(|(id, started_at)| ActiveTicketEntry::new(id, started_at)).collect()
}
