//! Active-ticket tracker
//!
//! Owns the running set as this client sees it and keeps three sources in
//! agreement: the persisted ledger, the last server snapshot and the clock.
//! Every method is synchronous. Ledger writes are committed before the method
//! returns, so callers can sequence them ahead of any network await.
//! Transitions (reconcile, begin, end, restore, elapsed refresh) run one at a
//! time, so a reconciliation pass never writes back an entry that `end` just
//! removed.

use std::sync::Arc;

use chamados_domain::{ActiveTicketEntry, ActiveTicketMap, ElapsedTimes, Ticket, TicketStatus};
use chrono::SecondsFormat;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info};

use super::elapsed::compute_elapsed_seconds;
use super::ledger::ActiveTicketLedger;
use super::ports::KeyValueStore;
use super::reconcile::determine_active_tickets;
use crate::clock::Clock;

/// How a ticket stopped being active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEnding {
    Completed,
    /// Cancelled tickets go back to open with no `startedAt`.
    Cancelled,
    /// The backend no longer knows the ticket.
    Gone,
}

/// State removed by [`ActiveTicketTracker::end`], kept so a failed request
/// can put it back.
#[derive(Debug, Clone, PartialEq)]
pub struct EndedTicket {
    pub ticket_id: String,
    pub started_at: Option<String>,
    server_ticket: Option<Ticket>,
}

pub struct ActiveTicketTracker {
    ledger: ActiveTicketLedger,
    clock: Arc<dyn Clock>,
    server: RwLock<Option<Arc<Vec<Ticket>>>>,
    transitions: Mutex<()>,
    active_tx: watch::Sender<Vec<ActiveTicketEntry>>,
    elapsed_tx: watch::Sender<ElapsedTimes>,
}

impl ActiveTicketTracker {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let (active_tx, _) = watch::channel(Vec::new());
        let (elapsed_tx, _) = watch::channel(ElapsedTimes::new());
        Self {
            ledger: ActiveTicketLedger::new(store),
            clock,
            server: RwLock::new(None),
            transitions: Mutex::new(()),
            active_tx,
            elapsed_tx,
        }
    }

    pub fn ledger(&self) -> &ActiveTicketLedger {
        &self.ledger
    }

    /// Run one reconciliation pass against the current ledger and snapshot.
    ///
    /// Safe to call at any time and any number of times; a pass over
    /// unchanged inputs writes nothing.
    pub fn reconcile(&self) -> Vec<ActiveTicketEntry> {
        let _transition = self.transitions.lock();
        let now = self.clock.now();

        let outcome = self.ledger.update(|persisted| {
            let snapshot = self.server.read().clone();
            let outcome =
                determine_active_tickets(persisted, snapshot.as_deref().map(Vec::as_slice), now);
            if outcome.changed {
                *persisted = outcome.persisted.clone();
            }
            outcome
        });

        if !outcome.dropped.is_empty() {
            info!(dropped = ?outcome.dropped, "Dropping finished tickets from active set");
        }

        self.publish(outcome.active.clone());
        outcome.active
    }

    /// Store a fresh server snapshot and reconcile against it.
    pub fn apply_server_tickets(&self, tickets: Vec<Ticket>) -> Vec<ActiveTicketEntry> {
        debug!(count = tickets.len(), "Applying server ticket snapshot");
        *self.server.write() = Some(Arc::new(tickets));
        self.reconcile()
    }

    /// Whether a server snapshot has been received.
    pub fn has_server_snapshot(&self) -> bool {
        self.server.read().is_some()
    }

    pub fn server_tickets(&self) -> Option<Arc<Vec<Ticket>>> {
        self.server.read().clone()
    }

    pub fn find_server_ticket(&self, ticket_id: &str) -> Option<Ticket> {
        self.server.read().as_ref()?.iter().find(|t| t.id == ticket_id).cloned()
    }

    /// Mark a ticket as running from `started_at`. Returns the ledger value
    /// it replaced.
    pub fn begin(&self, ticket_id: &str, started_at: &str) -> Option<String> {
        let _transition = self.transitions.lock();
        let previous = self.ledger.upsert(ticket_id, started_at);
        self.upsert_active(ticket_id, started_at);
        previous
    }

    /// Start a ticket from the current clock time. Returns the timestamp used.
    pub fn begin_now(&self, ticket_id: &str) -> String {
        let started_at = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.begin(ticket_id, &started_at);
        started_at
    }

    /// Adopt the server's `startedAt` after a confirmed check-in.
    pub fn confirm_started_at(&self, ticket_id: &str, server_started_at: &str) {
        let trimmed = server_started_at.trim();
        if trimmed.is_empty() {
            return;
        }
        let _transition = self.transitions.lock();
        self.ledger.upsert(ticket_id, trimmed);
        self.upsert_active(ticket_id, trimmed);
    }

    /// Roll back a [`begin`](Self::begin) whose request failed.
    pub fn abandon(&self, ticket_id: &str, previous: Option<String>) {
        let _transition = self.transitions.lock();
        match previous {
            Some(started_at) => {
                self.ledger.upsert(ticket_id, &started_at);
                self.upsert_active(ticket_id, &started_at);
            }
            None => {
                self.ledger.forget(ticket_id);
                self.remove_active(&[ticket_id]);
            }
        }
    }

    /// Stop tracking a ticket: drop its ledger entry and patch the local
    /// snapshot so the next pass cannot re-seed it.
    pub fn end(&self, ticket_id: &str, ending: TicketEnding) -> EndedTicket {
        let _transition = self.transitions.lock();
        let started_at = self.ledger.forget(ticket_id);
        let server_ticket = self.patch_snapshot(ticket_id, ending);
        self.remove_active(&[ticket_id]);
        info!(ticket_id, ?ending, "Ticket left the active set");
        EndedTicket { ticket_id: ticket_id.to_string(), started_at, server_ticket }
    }

    /// Undo an [`end`](Self::end).
    pub fn restore(&self, ended: EndedTicket) {
        let _transition = self.transitions.lock();
        if let Some(previous) = ended.server_ticket {
            if let Some(snapshot) = self.server.write().as_mut() {
                let tickets = Arc::make_mut(snapshot);
                match tickets.iter_mut().find(|t| t.id == previous.id) {
                    Some(slot) => *slot = previous,
                    None => tickets.push(previous),
                }
            }
        }

        if let Some(started_at) = ended.started_at {
            self.ledger.upsert(&ended.ticket_id, &started_at);
            self.upsert_active(&ended.ticket_id, &started_at);
        }
        debug!(ticket_id = %ended.ticket_id, "Restored ticket after failed request");
    }

    /// Replace one ticket in the server snapshot with a fresher copy.
    ///
    /// Does nothing while no snapshot has loaded: a partial list would make
    /// the next pass drop every other entry.
    pub fn upsert_server_ticket(&self, ticket: Ticket) {
        if let Some(snapshot) = self.server.write().as_mut() {
            let tickets = Arc::make_mut(snapshot);
            match tickets.iter_mut().find(|t| t.id == ticket.id) {
                Some(slot) => *slot = ticket,
                None => tickets.push(ticket),
            }
        }
    }

    /// First non-empty of: `explicit`, the server snapshot, the persisted
    /// entry (`persisted` if given, otherwise the ledger).
    pub fn resolve_started_at(
        &self,
        ticket_id: &str,
        explicit: Option<&str>,
        persisted: Option<&ActiveTicketMap>,
    ) -> Option<String> {
        if let Some(value) = explicit.map(str::trim).filter(|v| !v.is_empty()) {
            return Some(value.to_string());
        }

        if let Some(value) =
            self.find_server_ticket(ticket_id).and_then(|t| t.started_at().map(str::to_string))
        {
            return Some(value);
        }

        self.persisted_started_at(ticket_id, persisted)
    }

    pub fn elapsed_seconds(
        &self,
        ticket_id: &str,
        explicit: Option<&str>,
        persisted: Option<&ActiveTicketMap>,
    ) -> u64 {
        let resolved = self.resolve_started_at(ticket_id, explicit, persisted);
        let fallback = self.persisted_started_at(ticket_id, persisted);
        compute_elapsed_seconds(resolved.as_deref(), fallback.as_deref(), self.clock.now())
    }

    /// Recompute elapsed seconds for every active ticket and publish them.
    pub fn refresh_elapsed(&self) -> ElapsedTimes {
        let _transition = self.transitions.lock();
        let persisted = self.ledger.load();
        let times: ElapsedTimes = self
            .active()
            .iter()
            .map(|entry| {
                let secs = self.elapsed_seconds(
                    &entry.ticket_id,
                    Some(&entry.started_at),
                    Some(&persisted),
                );
                (entry.ticket_id.clone(), secs)
            })
            .collect();
        self.elapsed_tx.send_replace(times.clone());
        times
    }

    pub fn active(&self) -> Vec<ActiveTicketEntry> {
        self.active_tx.borrow().clone()
    }

    pub fn is_active(&self, ticket_id: &str) -> bool {
        self.active_tx.borrow().iter().any(|e| e.ticket_id == ticket_id)
    }

    pub fn elapsed(&self) -> ElapsedTimes {
        self.elapsed_tx.borrow().clone()
    }

    pub fn subscribe_active(&self) -> watch::Receiver<Vec<ActiveTicketEntry>> {
        self.active_tx.subscribe()
    }

    pub fn subscribe_elapsed(&self) -> watch::Receiver<ElapsedTimes> {
        self.elapsed_tx.subscribe()
    }

    fn persisted_started_at(
        &self,
        ticket_id: &str,
        persisted: Option<&ActiveTicketMap>,
    ) -> Option<String> {
        let lookup = |map: &ActiveTicketMap| {
            map.get(ticket_id).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };
        match persisted {
            Some(map) => lookup(map),
            None => lookup(&self.ledger.load()),
        }
    }

    fn patch_snapshot(&self, ticket_id: &str, ending: TicketEnding) -> Option<Ticket> {
        let mut guard = self.server.write();
        let tickets = Arc::make_mut(guard.as_mut()?);
        let index = tickets.iter().position(|t| t.id == ticket_id)?;
        let previous = tickets[index].clone();

        match ending {
            TicketEnding::Completed => {
                let now = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
                let ticket = &mut tickets[index];
                ticket.status = TicketStatus::Completed.backend_code().to_string();
                ticket.stopped_at = Some(now.clone());
                ticket.completed_at = Some(now);
            }
            TicketEnding::Cancelled => {
                let ticket = &mut tickets[index];
                ticket.status = TicketStatus::Open.backend_code().to_string();
                ticket.started_at = None;
            }
            TicketEnding::Gone => {
                tickets.remove(index);
            }
        }
        Some(previous)
    }

    fn upsert_active(&self, ticket_id: &str, started_at: &str) {
        self.active_tx.send_if_modified(|active| {
            match active.iter_mut().find(|e| e.ticket_id == ticket_id) {
                Some(entry) if entry.started_at == started_at => false,
                Some(entry) => {
                    entry.started_at = started_at.to_string();
                    true
                }
                None => {
                    active.push(ActiveTicketEntry::new(ticket_id, started_at));
                    active.sort_by(|a, b| a.ticket_id.cmp(&b.ticket_id));
                    true
                }
            }
        });
    }

    fn remove_active(&self, ticket_ids: &[&str]) {
        self.active_tx.send_if_modified(|active| {
            let before = active.len();
            active.retain(|e| !ticket_ids.contains(&e.ticket_id.as_str()));
            active.len() != before
        });
        self.elapsed_tx.send_if_modified(|times| {
            let before = times.len();
            times.retain(|id, _| !ticket_ids.contains(&id.as_str()));
            times.len() != before
        });
    }

    fn publish(&self, active: Vec<ActiveTicketEntry>) {
        self.elapsed_tx.send_if_modified(|times| {
            let before = times.len();
            times.retain(|id, _| active.iter().any(|e| &e.ticket_id == id));
            times.len() != before
        });
        self.active_tx.send_if_modified(|current| {
            if *current == active {
                false
            } else {
                *current = active;
                true
            }
        });
    }
}
