//! Decide which tickets are running from the persisted ledger and the last
//! server snapshot.

use chamados_domain::{ActiveTicketEntry, ActiveTicketMap, Ticket};
use chrono::{DateTime, SecondsFormat, Utc};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Running tickets, ordered by ticket id.
    pub active: Vec<ActiveTicketEntry>,
    /// Map to persist. Equal to the input when `changed` is false.
    pub persisted: ActiveTicketMap,
    pub changed: bool,
    /// Ticket ids removed from the ledger in this pass.
    pub dropped: Vec<String>,
}

/// Reconcile persisted entries with the server's view.
///
/// `server` is `None` while the ticket list has not loaded (or the fetch
/// failed); persisted entries are then kept verbatim. Once loaded:
///
/// - an empty ledger is seeded from running server tickets;
/// - entries whose ticket is missing or closed are dropped;
/// - surviving entries take the server's `startedAt` when it has one, else
///   keep the stored value, else fall back to `now`.
pub fn determine_active_tickets(
    persisted: &ActiveTicketMap,
    server: Option<&[Ticket]>,
    now: DateTime<Utc>,
) -> Reconciliation {
    let Some(server) = server else {
        return Reconciliation {
            active: entries(persisted),
            persisted: persisted.clone(),
            changed: false,
            dropped: Vec::new(),
        };
    };

    if persisted.is_empty() {
        let seeded: ActiveTicketMap = server
            .iter()
            .filter(|ticket| ticket.is_running() && !ticket.is_closed())
            .filter_map(|ticket| {
                ticket.started_at().map(|started| (ticket.id.clone(), started.to_string()))
            })
            .collect();

        return Reconciliation {
            active: entries(&seeded),
            changed: !seeded.is_empty(),
            persisted: seeded,
            dropped: Vec::new(),
        };
    }

    let mut next = ActiveTicketMap::new();
    let mut dropped = Vec::new();

    for (ticket_id, stored) in persisted {
        let Some(ticket) = server.iter().find(|ticket| &ticket.id == ticket_id) else {
            dropped.push(ticket_id.clone());
            continue;
        };

        if ticket.is_closed() {
            dropped.push(ticket_id.clone());
            continue;
        }

        let started_at = ticket
            .started_at()
            .map(str::to_string)
            .or_else(|| Some(stored.trim()).filter(|s| !s.is_empty()).map(str::to_string))
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

        next.insert(ticket_id.clone(), started_at);
    }

    Reconciliation {
        active: entries(&next),
        changed: &next != persisted,
        persisted: next,
        dropped,
    }
}

fn entries(map: &ActiveTicketMap) -> Vec<ActiveTicketEntry> {
    chamados_domain::entries_from_map(map)
}
